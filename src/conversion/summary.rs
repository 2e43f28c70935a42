use super::{ConversionResponse, ConversionResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchOutcome {
    AllSucceeded,
    PartiallySucceeded,
    AllFailed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchSummary {
    pub total: usize,
    pub succeeded: usize,
}

impl BatchSummary {
    pub fn from_results(results: &[ConversionResult]) -> Self {
        results.iter().fold(
            Self {
                total: 0,
                succeeded: 0,
            },
            |acc, result| Self {
                total: acc.total + 1,
                succeeded: acc.succeeded + usize::from(result.is_success()),
            },
        )
    }

    pub fn failed(&self) -> usize {
        self.total - self.succeeded
    }

    /// A batch succeeds when at least one file converted.
    pub fn is_success(&self) -> bool {
        self.succeeded > 0
    }

    pub fn outcome(&self) -> BatchOutcome {
        if self.succeeded == 0 {
            BatchOutcome::AllFailed
        } else if self.succeeded == self.total {
            BatchOutcome::AllSucceeded
        } else {
            BatchOutcome::PartiallySucceeded
        }
    }

    pub fn message(&self) -> String {
        match self.outcome() {
            BatchOutcome::AllSucceeded => {
                format!("All {} files converted successfully", self.total)
            }
            BatchOutcome::PartiallySucceeded => format!(
                "{} files converted successfully, {} files failed",
                self.succeeded,
                self.failed()
            ),
            BatchOutcome::AllFailed => format!("All {} files failed to convert", self.total),
        }
    }
}

/// Folds per-file results into the batch response, preserving input order.
pub fn summarize_batch(results: Vec<ConversionResult>) -> ConversionResponse {
    let summary = BatchSummary::from_results(results.as_slice());
    let error = matches!(summary.outcome(), BatchOutcome::AllFailed)
        .then(|| String::from("Batch conversion failed"));
    let error_code = error.as_ref().map(|_| "batch_failed");

    ConversionResponse {
        success: summary.is_success(),
        message: summary.message(),
        output_file: None,
        results: Some(results),
        error,
        error_code,
    }
}
