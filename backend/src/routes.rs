use actix_web::{web, HttpResponse, Result};
use log::{error, info};
use shared::{
    AddCaseRequest, AddEvidenceRequest, AddSuspectRequest, CaseWithEvidence, ErrorResponse,
    EvidenceRecord, EvidenceSummary, MessageResponse, PredictRequest, PredictResponse,
    RegisterRequest, ReportResponse,
};

use crate::db::{RepositoryError, SqliteRepository};
use crate::ml::{ModelError, PredictService};

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/register").route(web::post().to(register)))
        .service(web::resource("/add_case").route(web::post().to(add_case)))
        .service(web::resource("/view_cases").route(web::get().to(view_cases)))
        .service(web::resource("/delete_case/{id}").route(web::delete().to(delete_case)))
        .service(web::resource("/add_suspect").route(web::post().to(add_suspect)))
        .service(web::resource("/delete_suspect/{id}").route(web::delete().to(delete_suspect)))
        .service(web::resource("/add_evidence").route(web::post().to(add_evidence)))
        .service(web::resource("/view_evidence/{case_id}").route(web::get().to(view_evidence)))
        .service(web::resource("/delete_evidence/{id}").route(web::delete().to(delete_evidence)))
        .service(web::resource("/predict_suspect").route(web::post().to(predict_suspect)))
        .service(web::resource("/report").route(web::get().to(report)));
}

fn internal_error(context: &str, e: RepositoryError) -> HttpResponse {
    error!("{context}: {e}");
    HttpResponse::InternalServerError().json(ErrorResponse {
        error: e.to_string(),
    })
}

fn message(text: &str) -> HttpResponse {
    HttpResponse::Ok().json(MessageResponse {
        message: text.to_string(),
    })
}

// Most endpoints report failures as 200-status bodies with an "error" key;
// only /add_evidence uses real HTTP error codes. That per-endpoint split is
// the contract the original clients were written against, so it is kept
// rather than normalized.
fn not_found_body(text: &str) -> HttpResponse {
    HttpResponse::Ok().json(ErrorResponse {
        error: text.to_string(),
    })
}

async fn register(
    repo: web::Data<SqliteRepository>,
    body: web::Json<RegisterRequest>,
) -> Result<HttpResponse> {
    match repo.create_user(&body.username, &body.password, &body.role) {
        Ok(id) => {
            info!("Registered user {} (id {id})", body.username);
            Ok(message("User registered successfully"))
        }
        Err(RepositoryError::DuplicateUsername) => {
            Ok(HttpResponse::BadRequest().json(ErrorResponse {
                error: "Username already exists".to_string(),
            }))
        }
        Err(e) => Ok(internal_error("register failed", e)),
    }
}

async fn add_case(
    repo: web::Data<SqliteRepository>,
    body: Option<web::Json<AddCaseRequest>>,
) -> Result<HttpResponse> {
    let Some(body) = body else {
        return Ok(HttpResponse::Ok().json(ErrorResponse {
            error: "No JSON received".to_string(),
        }));
    };

    // Status is always "Open" on creation, whatever the request carried.
    match repo.create_case(
        body.crime_type.as_deref(),
        body.location.as_deref(),
        body.time_of_day.as_deref(),
    ) {
        Ok(id) => {
            info!("Added case {id}");
            Ok(message("Case added successfully"))
        }
        Err(e) => Ok(internal_error("add_case failed", e)),
    }
}

async fn view_cases(repo: web::Data<SqliteRepository>) -> Result<HttpResponse> {
    let cases = match repo.list_cases() {
        Ok(cases) => cases,
        Err(e) => return Ok(internal_error("view_cases failed", e)),
    };

    let mut result = Vec::with_capacity(cases.len());
    for case in cases {
        let evidence = match repo.list_evidence_for_case(case.id) {
            Ok(rows) => rows
                .into_iter()
                .map(|e| EvidenceSummary {
                    id: e.id,
                    evidence_type: e.evidence_type,
                    description: e.description,
                })
                .collect(),
            Err(e) => return Ok(internal_error("view_cases failed", e)),
        };
        result.push(CaseWithEvidence {
            id: case.id,
            crime_type: case.crime_type,
            location: case.location,
            time_of_day: case.time_of_day,
            status: case.status,
            evidence,
        });
    }
    Ok(HttpResponse::Ok().json(result))
}

async fn delete_case(
    repo: web::Data<SqliteRepository>,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let case_id = path.into_inner();
    match repo.delete_case(case_id) {
        Ok(true) => {
            info!("Deleted case {case_id} (evidence cascaded)");
            Ok(message("Case deleted successfully"))
        }
        Ok(false) => Ok(not_found_body("Case not found")),
        Err(e) => Ok(internal_error("delete_case failed", e)),
    }
}

async fn add_suspect(
    repo: web::Data<SqliteRepository>,
    body: web::Json<AddSuspectRequest>,
) -> Result<HttpResponse> {
    match repo.create_suspect(&body.name, &body.criminal_history) {
        Ok(_) => Ok(message("Suspect added successfully")),
        Err(e) => Ok(internal_error("add_suspect failed", e)),
    }
}

async fn delete_suspect(
    repo: web::Data<SqliteRepository>,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    match repo.delete_suspect(path.into_inner()) {
        Ok(true) => Ok(message("Suspect deleted successfully")),
        Ok(false) => Ok(not_found_body("Suspect not found")),
        Err(e) => Ok(internal_error("delete_suspect failed", e)),
    }
}

async fn add_evidence(
    repo: web::Data<SqliteRepository>,
    body: web::Json<AddEvidenceRequest>,
) -> Result<HttpResponse> {
    // Unlike the delete endpoints, this path reports a missing case with a
    // real 404 status.
    match repo.case_exists(body.case_id) {
        Ok(false) => {
            return Ok(HttpResponse::NotFound().json(ErrorResponse {
                error: "Case not found".to_string(),
            }));
        }
        Ok(true) => {}
        Err(e) => return Ok(internal_error("add_evidence failed", e)),
    }

    match repo.create_evidence(
        body.case_id,
        body.evidence_type.as_deref(),
        body.description.as_deref(),
    ) {
        Ok(id) => {
            info!("Added evidence {id} to case {}", body.case_id);
            Ok(message("Evidence added successfully"))
        }
        Err(e) => Ok(internal_error("add_evidence failed", e)),
    }
}

async fn view_evidence(
    repo: web::Data<SqliteRepository>,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    match repo.list_evidence_for_case(path.into_inner()) {
        Ok(rows) => {
            let result: Vec<EvidenceRecord> = rows
                .into_iter()
                .map(|e| EvidenceRecord {
                    id: e.id,
                    case_id: e.case_id,
                    evidence_type: e.evidence_type,
                    description: e.description,
                })
                .collect();
            Ok(HttpResponse::Ok().json(result))
        }
        Err(e) => Ok(internal_error("view_evidence failed", e)),
    }
}

async fn delete_evidence(
    repo: web::Data<SqliteRepository>,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    match repo.delete_evidence(path.into_inner()) {
        Ok(true) => Ok(message("Evidence deleted successfully")),
        Ok(false) => Ok(not_found_body("Evidence not found")),
        Err(e) => Ok(internal_error("delete_evidence failed", e)),
    }
}

async fn predict_suspect(
    service: web::Data<PredictService>,
    body: web::Json<PredictRequest>,
) -> Result<HttpResponse> {
    match service.predict(&body.crime_type, &body.location, &body.time_of_day) {
        Ok(label) => Ok(HttpResponse::Ok().json(PredictResponse {
            suspect_likely: label,
        })),
        Err(ModelError::NotTrained) => Ok(HttpResponse::Ok().json(ErrorResponse {
            error: "ML model not trained".to_string(),
        })),
        Err(ModelError::UnseenCategory { column, value }) => {
            info!("Prediction rejected: unseen {column} value {value:?}");
            Ok(HttpResponse::Ok().json(ErrorResponse {
                error: "Invalid input values".to_string(),
            }))
        }
        Err(e) => {
            error!("predict_suspect failed: {e}");
            Ok(HttpResponse::InternalServerError().json(ErrorResponse {
                error: e.to_string(),
            }))
        }
    }
}

async fn report(repo: web::Data<SqliteRepository>) -> Result<HttpResponse> {
    match repo.report_counts() {
        Ok(counts) => Ok(HttpResponse::Ok().json(ReportResponse {
            total_cases: counts.total_cases,
            open_cases: counts.open_cases,
            total_suspects: counts.total_suspects,
            total_evidence: counts.total_evidence,
        })),
        Err(e) => Ok(internal_error("report failed", e)),
    }
}
