use serde::{Deserialize, Serialize};

use super::ModelError;

/// Bijection from a finite set of category strings onto `[0, k)`.
///
/// Fit once from the distinct values of one training column, in
/// lexicographic order, so that repeated fits over the same data always
/// produce the same mapping. The integer codes are only meaningful
/// relative to the fit that produced them, which is why encoders are
/// persisted inside the model bundle rather than refit at load time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabelEncoder {
    column: String,
    classes: Vec<String>,
}

impl LabelEncoder {
    pub fn fit<'a, I>(column: &str, values: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut classes: Vec<String> = values.into_iter().map(str::to_owned).collect();
        classes.sort();
        classes.dedup();
        Self {
            column: column.to_owned(),
            classes,
        }
    }

    /// Maps a category to its integer code. Categories never seen during
    /// fit are the principal runtime error of the prediction flow.
    pub fn transform(&self, value: &str) -> Result<usize, ModelError> {
        self.classes
            .binary_search_by(|c| c.as_str().cmp(value))
            .map_err(|_| ModelError::UnseenCategory {
                column: self.column.clone(),
                value: value.to_owned(),
            })
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fit_orders_classes_lexicographically() {
        let enc = LabelEncoder::fit("crime_type", ["theft", "assault", "fraud", "theft"]);
        assert_eq!(enc.classes(), ["assault", "fraud", "theft"]);
        assert_eq!(enc.len(), 3);
    }

    #[test]
    fn transform_is_a_contiguous_bijection() {
        let enc = LabelEncoder::fit("location", ["suburbs", "downtown", "mall"]);
        assert_eq!(enc.transform("downtown").unwrap(), 0);
        assert_eq!(enc.transform("mall").unwrap(), 1);
        assert_eq!(enc.transform("suburbs").unwrap(), 2);
    }

    #[test]
    fn unseen_category_is_an_error() {
        let enc = LabelEncoder::fit("time_of_day", ["night", "morning"]);
        let err = enc.transform("dusk").unwrap_err();
        match err {
            ModelError::UnseenCategory { column, value } => {
                assert_eq!(column, "time_of_day");
                assert_eq!(value, "dusk");
            }
            other => panic!("expected UnseenCategory, got {other:?}"),
        }
    }

    #[test]
    fn refit_over_same_data_is_identical() {
        let a = LabelEncoder::fit("c", ["b", "a", "c"]);
        let b = LabelEncoder::fit("c", ["c", "b", "a"]);
        assert_eq!(a.classes(), b.classes());
    }
}
