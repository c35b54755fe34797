use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Clone)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
    pub role: String,
}

#[derive(Serialize, Deserialize, Clone)]
pub struct AddCaseRequest {
    pub crime_type: Option<String>,
    pub location: Option<String>,
    pub time_of_day: Option<String>,
}

#[derive(Serialize, Deserialize, Clone)]
pub struct AddSuspectRequest {
    pub name: String,
    pub criminal_history: String,
}

#[derive(Serialize, Deserialize, Clone)]
pub struct AddEvidenceRequest {
    pub case_id: i64,
    pub evidence_type: Option<String>,
    pub description: Option<String>,
}

#[derive(Serialize, Deserialize, Clone)]
pub struct PredictRequest {
    pub crime_type: String,
    pub location: String,
    pub time_of_day: String,
}

#[derive(Serialize, Deserialize, Clone)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Serialize, Deserialize, Clone)]
pub struct ErrorResponse {
    pub error: String,
}

/// Evidence as nested under a case in /view_cases (no case_id, the
/// parent is implied by nesting).
#[derive(Serialize, Deserialize, Clone)]
pub struct EvidenceSummary {
    pub id: i64,
    pub evidence_type: Option<String>,
    pub description: Option<String>,
}

/// Evidence as returned by /view_evidence/{case_id}.
#[derive(Serialize, Deserialize, Clone)]
pub struct EvidenceRecord {
    pub id: i64,
    pub case_id: i64,
    pub evidence_type: Option<String>,
    pub description: Option<String>,
}

#[derive(Serialize, Deserialize, Clone)]
pub struct CaseWithEvidence {
    pub id: i64,
    pub crime_type: Option<String>,
    pub location: Option<String>,
    pub time_of_day: Option<String>,
    pub status: String,
    pub evidence: Vec<EvidenceSummary>,
}

#[derive(Serialize, Deserialize, Clone)]
pub struct PredictResponse {
    pub suspect_likely: String,
}

#[derive(Serialize, Deserialize, Clone)]
pub struct ReportResponse {
    pub total_cases: i64,
    pub open_cases: i64,
    pub total_suspects: i64,
    pub total_evidence: i64,
}
