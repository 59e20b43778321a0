/// Scoring predicate builder
///
/// Turns search filters into an ordered list of weighted terms. The same
/// plan is evaluated two ways: rendered into a parameterized SQL expression
/// for Postgres, or evaluated directly against in-memory task signals.
///
/// # Weights
///
/// | Term                  | Condition                                   | Weight      |
/// |-----------------------|---------------------------------------------|-------------|
/// | `TitleContains`       | keyword is a case-insensitive substring     | 6           |
/// | `DescriptionContains` | keyword is a case-insensitive substring     | 4           |
/// | `CompletionEquals`    | completion status equals filter             | 3           |
/// | `VisibilityEquals`    | public flag equals filter                   | 2           |
/// | `DueOnOrBefore`       | due date on or before cutoff                | 1           |
/// | `ShareCount`          | number of users the task is shared with     | 1 per share |
/// | `HasPdfAttachment`    | task has a PDF attachment                   | 0.5         |
///
/// Absent filters add no term at all, so they never penalize a task.

use crate::models::{file::PDF_MIME, task::Task};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::{Postgres, QueryBuilder};

pub const TITLE_WEIGHT: f64 = 6.0;
pub const DESCRIPTION_WEIGHT: f64 = 4.0;
pub const COMPLETION_WEIGHT: f64 = 3.0;
pub const VISIBILITY_WEIGHT: f64 = 2.0;
pub const DUE_DATE_WEIGHT: f64 = 1.0;
pub const SHARE_WEIGHT: f64 = 1.0;
pub const PDF_WEIGHT: f64 = 0.5;

/// Search request filters
///
/// An empty keyword is a substring of every title and description, so it
/// matches every task.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchFilters {
    pub keyword: String,
    pub completion_status: Option<bool>,
    pub is_public: Option<bool>,
    pub due_date: Option<NaiveDate>,
}

/// One weighted signal contributing to a task's score
#[derive(Debug, Clone, PartialEq)]
pub enum ScoreTerm {
    TitleContains(String),
    DescriptionContains(String),
    CompletionEquals(bool),
    VisibilityEquals(bool),
    DueOnOrBefore(NaiveDate),
    ShareCount,
    HasPdfAttachment,
}

/// Per-task inputs for evaluating a plan without a database
#[derive(Debug, Clone, PartialEq)]
pub struct TaskSignals {
    pub task: Task,

    /// Users the task is shared with
    pub share_count: usize,

    /// MIME types of the task's attachments
    pub attachment_formats: Vec<String>,
}

impl TaskSignals {
    pub fn new(task: Task) -> Self {
        Self {
            task,
            share_count: 0,
            attachment_formats: Vec::new(),
        }
    }

    pub fn has_pdf(&self) -> bool {
        self.attachment_formats.iter().any(|format| format == PDF_MIME)
    }
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

impl ScoreTerm {
    /// Multiplier applied to the term's raw value
    pub fn weight(&self) -> f64 {
        match self {
            ScoreTerm::TitleContains(_) => TITLE_WEIGHT,
            ScoreTerm::DescriptionContains(_) => DESCRIPTION_WEIGHT,
            ScoreTerm::CompletionEquals(_) => COMPLETION_WEIGHT,
            ScoreTerm::VisibilityEquals(_) => VISIBILITY_WEIGHT,
            ScoreTerm::DueOnOrBefore(_) => DUE_DATE_WEIGHT,
            ScoreTerm::ShareCount => SHARE_WEIGHT,
            ScoreTerm::HasPdfAttachment => PDF_WEIGHT,
        }
    }

    /// Raw (unweighted) value: 0 or 1 for predicates, a count for shares
    pub fn raw_value(&self, signals: &TaskSignals) -> f64 {
        let task = &signals.task;
        let hit = match self {
            ScoreTerm::TitleContains(keyword) => contains_ignore_case(&task.title, keyword),
            ScoreTerm::DescriptionContains(keyword) => {
                contains_ignore_case(&task.description, keyword)
            }
            ScoreTerm::CompletionEquals(wanted) => task.completion_status == *wanted,
            ScoreTerm::VisibilityEquals(wanted) => task.is_public == *wanted,
            ScoreTerm::DueOnOrBefore(cutoff) => task.due_date <= *cutoff,
            ScoreTerm::ShareCount => return signals.share_count as f64,
            ScoreTerm::HasPdfAttachment => signals.has_pdf(),
        };

        if hit {
            1.0
        } else {
            0.0
        }
    }

    /// Renders the raw value as SQL over the `tasks` alias `t`
    ///
    /// User-supplied values are always bound, never spliced into the text.
    fn push_raw_sql(&self, builder: &mut QueryBuilder<'_, Postgres>) {
        match self {
            ScoreTerm::TitleContains(keyword) => push_contains(builder, "t.title", keyword),
            ScoreTerm::DescriptionContains(keyword) => {
                push_contains(builder, "t.description", keyword)
            }
            ScoreTerm::CompletionEquals(wanted) => {
                builder.push("(CASE WHEN t.completion_status = ");
                builder.push_bind(*wanted);
                builder.push(" THEN 1 ELSE 0 END)");
            }
            ScoreTerm::VisibilityEquals(wanted) => {
                builder.push("(CASE WHEN t.is_public = ");
                builder.push_bind(*wanted);
                builder.push(" THEN 1 ELSE 0 END)");
            }
            ScoreTerm::DueOnOrBefore(cutoff) => {
                builder.push("(CASE WHEN t.due_date <= ");
                builder.push_bind(*cutoff);
                builder.push(" THEN 1 ELSE 0 END)");
            }
            ScoreTerm::ShareCount => {
                builder.push("(SELECT COUNT(*) FROM share_with s WHERE s.task_id = t.id)");
            }
            ScoreTerm::HasPdfAttachment => {
                builder.push(
                    "(CASE WHEN EXISTS (SELECT 1 FROM files f WHERE f.task_id = t.id AND f.file_format = ",
                );
                builder.push_bind(PDF_MIME);
                builder.push(") THEN 1 ELSE 0 END)");
            }
        }
    }
}

/// Literal, case-insensitive substring test
///
/// `strpos` treats `%` and `_` as ordinary characters, unlike `LIKE`.
/// Case folding is done by Postgres `lower()`, which follows the database
/// ctype: non-ASCII letters fold like Rust's `to_lowercase` under a UTF-8
/// locale but are left untouched under the `C` locale, so in-memory and
/// database scores only agree on non-ASCII keywords with a UTF-8 database.
fn push_contains(builder: &mut QueryBuilder<'_, Postgres>, column: &str, keyword: &str) {
    if keyword.is_empty() {
        builder.push("1");
        return;
    }

    builder.push("(CASE WHEN strpos(lower(");
    builder.push(column);
    builder.push("), lower(");
    builder.push_bind(keyword.to_string());
    builder.push(")) > 0 THEN 1 ELSE 0 END)");
}

/// Ordered list of weighted terms for one search request
#[derive(Debug, Clone, PartialEq)]
pub struct ScoringPlan {
    terms: Vec<ScoreTerm>,
}

impl ScoringPlan {
    /// Builds the plan for a search request
    ///
    /// Keyword, share count and PDF terms are always present; the
    /// completion, visibility and due-date terms only when their filter is.
    pub fn from_filters(filters: &SearchFilters) -> Self {
        let mut terms = vec![
            ScoreTerm::TitleContains(filters.keyword.clone()),
            ScoreTerm::DescriptionContains(filters.keyword.clone()),
        ];

        if let Some(status) = filters.completion_status {
            terms.push(ScoreTerm::CompletionEquals(status));
        }
        if let Some(is_public) = filters.is_public {
            terms.push(ScoreTerm::VisibilityEquals(is_public));
        }
        if let Some(cutoff) = filters.due_date {
            terms.push(ScoreTerm::DueOnOrBefore(cutoff));
        }

        terms.push(ScoreTerm::ShareCount);
        terms.push(ScoreTerm::HasPdfAttachment);

        Self { terms }
    }

    pub fn terms(&self) -> &[ScoreTerm] {
        &self.terms
    }

    /// Sum of weighted term values for one task
    pub fn score(&self, signals: &TaskSignals) -> f64 {
        self.terms
            .iter()
            .map(|term| term.raw_value(signals) * term.weight())
            .sum()
    }

    /// Appends the score as a `DOUBLE PRECISION` SQL expression
    ///
    /// The expression reads the task through alias `t`.
    pub fn push_score_expr(&self, builder: &mut QueryBuilder<'_, Postgres>) {
        builder.push("CAST((");

        if self.terms.is_empty() {
            builder.push("0");
        }

        for (i, term) in self.terms.iter().enumerate() {
            if i > 0 {
                builder.push(" + ");
            }
            term.push_raw_sql(builder);
            builder.push(" * ");
            builder.push(term.weight());
        }

        builder.push(") AS DOUBLE PRECISION)");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn signals(title: &str, description: &str, share_count: usize, formats: &[&str]) -> TaskSignals {
        TaskSignals {
            task: Task {
                id: 1,
                title: title.to_string(),
                description: description.to_string(),
                completion_status: false,
                due_date: NaiveDate::from_ymd_opt(2024, 6, 15).unwrap(),
                is_public: true,
                created_by: Some(1),
                responsible: None,
                created_at: Utc::now(),
            },
            share_count,
            attachment_formats: formats.iter().map(|f| f.to_string()).collect(),
        }
    }

    fn keyword(keyword: &str) -> SearchFilters {
        SearchFilters {
            keyword: keyword.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_absent_filters_are_omitted() {
        let plan = ScoringPlan::from_filters(&keyword("report"));
        assert_eq!(
            plan.terms(),
            &[
                ScoreTerm::TitleContains("report".to_string()),
                ScoreTerm::DescriptionContains("report".to_string()),
                ScoreTerm::ShareCount,
                ScoreTerm::HasPdfAttachment,
            ]
        );
    }

    #[test]
    fn test_present_filters_add_terms() {
        let cutoff = NaiveDate::from_ymd_opt(2024, 12, 31).unwrap();
        let plan = ScoringPlan::from_filters(&SearchFilters {
            keyword: "x".to_string(),
            completion_status: Some(true),
            is_public: Some(false),
            due_date: Some(cutoff),
        });

        assert_eq!(plan.terms().len(), 7);
        assert!(plan.terms().contains(&ScoreTerm::CompletionEquals(true)));
        assert!(plan.terms().contains(&ScoreTerm::VisibilityEquals(false)));
        assert!(plan.terms().contains(&ScoreTerm::DueOnOrBefore(cutoff)));
    }

    #[test]
    fn test_keyword_only_formula() {
        let plan = ScoringPlan::from_filters(&keyword("report"));

        // 6 (title) + 4 (description) + 2 shares + 0.5 pdf
        let both = signals("Monthly Report", "report for finance", 2, &[PDF_MIME]);
        assert_eq!(plan.score(&both), 12.5);

        let title_only = signals("REPORT draft", "numbers", 0, &[]);
        assert_eq!(plan.score(&title_only), 6.0);

        let none = signals("Groceries", "milk", 1, &["image/png"]);
        assert_eq!(plan.score(&none), 1.0);
    }

    #[test]
    fn test_each_share_adds_one() {
        let plan = ScoringPlan::from_filters(&keyword("nothing-matches"));
        let mut task = signals("a", "b", 3, &[]);
        let before = plan.score(&task);

        task.share_count += 1;
        assert_eq!(plan.score(&task) - before, 1.0);

        task.share_count -= 2;
        assert_eq!(plan.score(&task) - before, -1.0);
    }

    #[test]
    fn test_empty_keyword_matches_everything() {
        let plan = ScoringPlan::from_filters(&keyword(""));
        assert_eq!(plan.score(&signals("anything", "at all", 0, &[])), 10.0);
    }

    #[test]
    fn test_keyword_folds_non_ascii_case() {
        let plan = ScoringPlan::from_filters(&keyword("ÉTÉ"));
        assert_eq!(plan.score(&signals("Plans pour l'été", "Straße", 0, &[])), 6.0);

        let plan = ScoringPlan::from_filters(&keyword("STRASSE"));
        assert_eq!(plan.score(&signals("x", "Straße", 0, &[])), 0.0);
    }

    #[test]
    fn test_keyword_wildcards_are_literal() {
        let plan = ScoringPlan::from_filters(&keyword("50%"));
        assert_eq!(plan.score(&signals("50% done", "", 0, &[])), 6.0);
        assert_eq!(plan.score(&signals("500 done", "", 0, &[])), 0.0);
    }

    #[test]
    fn test_filter_terms() {
        let mut task = signals("t", "d", 0, &[]);
        task.task.completion_status = true;
        task.task.is_public = false;

        let plan = ScoringPlan::from_filters(&SearchFilters {
            keyword: "zzz".to_string(),
            completion_status: Some(true),
            is_public: Some(false),
            due_date: Some(NaiveDate::from_ymd_opt(2024, 6, 15).unwrap()),
        });
        assert_eq!(plan.score(&task), 3.0 + 2.0 + 1.0);

        let plan = ScoringPlan::from_filters(&SearchFilters {
            keyword: "zzz".to_string(),
            completion_status: Some(false),
            is_public: Some(true),
            due_date: Some(NaiveDate::from_ymd_opt(2024, 6, 14).unwrap()),
        });
        assert_eq!(plan.score(&task), 0.0);
    }

    #[test]
    fn test_pdf_bonus_requires_pdf() {
        let plan = ScoringPlan::from_filters(&keyword("zzz"));
        assert_eq!(plan.score(&signals("a", "b", 0, &[PDF_MIME])), 0.5);
        assert_eq!(plan.score(&signals("a", "b", 0, &["image/jpeg"])), 0.0);
    }

    #[test]
    fn test_sql_binds_user_values() {
        let filters = SearchFilters {
            keyword: "'; DROP TABLE tasks; --".to_string(),
            completion_status: Some(true),
            is_public: None,
            due_date: Some(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()),
        };
        let plan = ScoringPlan::from_filters(&filters);

        let mut builder = QueryBuilder::<Postgres>::new("SELECT ");
        plan.push_score_expr(&mut builder);
        let sql = builder.sql();

        assert!(!sql.contains("DROP TABLE"));
        assert!(!sql.contains("2024-01-01"));
        // title, description, completion, due date, pdf mime
        assert!(sql.contains("$5"));
        assert!(!sql.contains("$6"));
        assert!(sql.contains("share_with"));
    }

    #[test]
    fn test_sql_empty_keyword_needs_no_bind() {
        let plan = ScoringPlan::from_filters(&keyword(""));
        let mut builder = QueryBuilder::<Postgres>::new("SELECT ");
        plan.push_score_expr(&mut builder);

        // only the pdf mime type is bound
        assert!(builder.sql().contains("$1"));
        assert!(!builder.sql().contains("$2"));
    }
}
