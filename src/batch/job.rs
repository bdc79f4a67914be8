use crate::validate::document::RejectReason;

/// One submitted document: raw bytes plus the filename it arrived with.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InputDocument {
    /// Filename as declared by the submitter.
    pub filename: String,
    /// Raw document bytes.
    pub bytes: Vec<u8>,
}

impl InputDocument {
    /// Wrap a received document.
    pub fn new(filename: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            filename: filename.into(),
            bytes: bytes.into(),
        }
    }

    /// Case-insensitive `.svg` extension check.
    pub fn has_svg_extension(&self) -> bool {
        has_svg_extension(&self.filename)
    }

    /// Filename of the produced container: the last extension replaced by `.tgs`.
    pub fn output_filename(&self) -> String {
        output_filename(&self.filename)
    }
}

/// Case-insensitive `.svg` extension check on a bare filename.
pub fn has_svg_extension(filename: &str) -> bool {
    filename.to_ascii_lowercase().ends_with(".svg")
}

/// Replace the last extension of `filename` with `.tgs` (or append it when there is none).
pub fn output_filename(filename: &str) -> String {
    let stem = match filename.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem,
        _ => filename,
    };
    format!("{stem}.tgs")
}

/// Pipeline stage that terminated a job.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Document validation.
    Validate,
    /// Rasterization.
    Render,
    /// Document building, embedding and compression.
    Encode,
}

/// Terminal error of a job, tagged with the stage that produced it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FailureReason {
    /// Refused by the validator.
    Rejected(RejectReason),
    /// The rasterizer failed.
    Render(String),
    /// Embedding, serialization or compression failed.
    Encode(String),
}

impl FailureReason {
    /// Stage that produced the failure.
    pub fn stage(&self) -> Stage {
        match self {
            Self::Rejected(_) => Stage::Validate,
            Self::Render(_) => Stage::Render,
            Self::Encode(_) => Stage::Encode,
        }
    }

    /// Stable kebab-case name of the failure kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Rejected(r) => r.kind(),
            Self::Render(_) => "render-error",
            Self::Encode(_) => "encode-error",
        }
    }

    /// Short explanation suitable for the submitter.
    pub fn user_message(&self) -> String {
        match self {
            Self::Rejected(r) => r.user_message(),
            Self::Render(_) => "could not be rendered".to_string(),
            Self::Encode(_) => "conversion failed".to_string(),
        }
    }
}

impl std::fmt::Display for FailureReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Rejected(r) => std::fmt::Display::fmt(r, f),
            Self::Render(detail) | Self::Encode(detail) => {
                write!(f, "{}: {detail}", self.kind())
            }
        }
    }
}

/// Per-job result delivered to the caller.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum JobOutcome {
    /// The job produced a container.
    Success {
        /// gzip-compressed Lottie JSON.
        container: Vec<u8>,
    },
    /// The job stopped in a failure state.
    Failure {
        /// What stopped it.
        reason: FailureReason,
    },
}

impl JobOutcome {
    /// Return `true` for [`JobOutcome::Success`].
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// The container bytes of a successful job.
    pub fn container(&self) -> Option<&[u8]> {
        match self {
            Self::Success { container } => Some(container),
            Self::Failure { .. } => None,
        }
    }

    /// The failure reason of a failed job.
    pub fn failure(&self) -> Option<&FailureReason> {
        match self {
            Self::Success { .. } => None,
            Self::Failure { reason } => Some(reason),
        }
    }
}

/// Lifecycle of one job.
///
/// `Queued → Validating → {Rejected | Rasterizing} → {RenderFailed | Building} → Encoding →
/// {EncodeFailed | Done}`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum JobState {
    /// Waiting for its turn.
    Queued,
    /// Running the validator.
    Validating,
    /// Refused by the validator (terminal).
    Rejected(RejectReason),
    /// Running the rasterizer.
    Rasterizing,
    /// Rasterizer failed (terminal).
    RenderFailed(String),
    /// Building the animation document.
    Building,
    /// Compressing the container.
    Encoding,
    /// Encoding failed (terminal).
    EncodeFailed(String),
    /// Container produced (terminal).
    Done,
}

impl JobState {
    /// Return `true` when no further transition can happen.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Rejected(_) | Self::RenderFailed(_) | Self::EncodeFailed(_) | Self::Done
        )
    }

    /// Whether `self → next` is an edge of the job lifecycle.
    pub fn can_transition_to(&self, next: &JobState) -> bool {
        use JobState::*;
        matches!(
            (self, next),
            (Queued, Validating)
                | (Validating, Rejected(_))
                | (Validating, Rasterizing)
                | (Rasterizing, RenderFailed(_))
                | (Rasterizing, Building)
                | (Building, Encoding)
                | (Encoding, EncodeFailed(_))
                | (Encoding, Done)
        )
    }

    /// Short lowercase name, for logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Queued => "queued",
            Self::Validating => "validating",
            Self::Rejected(_) => "rejected",
            Self::Rasterizing => "rasterizing",
            Self::RenderFailed(_) => "render-failed",
            Self::Building => "building",
            Self::Encoding => "encoding",
            Self::EncodeFailed(_) => "encode-failed",
            Self::Done => "done",
        }
    }
}

/// A document's path through the pipeline within one batch.
///
/// `index` is assigned when the batch is created and never changes.
#[derive(Clone, Debug)]
pub struct ConversionJob {
    index: usize,
    input: InputDocument,
    state: JobState,
}

impl ConversionJob {
    pub(crate) fn new(index: usize, input: InputDocument) -> Self {
        Self {
            index,
            input,
            state: JobState::Queued,
        }
    }

    /// Position within the batch.
    pub fn index(&self) -> usize {
        self.index
    }

    /// The submitted document.
    pub fn input(&self) -> &InputDocument {
        &self.input
    }

    /// Current lifecycle state.
    pub fn state(&self) -> &JobState {
        &self.state
    }

    /// Move to `next`. Edges outside the lifecycle are a coordinator bug.
    pub(crate) fn advance(&mut self, next: JobState) {
        debug_assert!(
            self.state.can_transition_to(&next),
            "illegal job transition {} -> {}",
            self.state.name(),
            next.name()
        );
        tracing::debug!(
            job = self.index,
            from = self.state.name(),
            to = next.name(),
            "job transition"
        );
        self.state = next;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/batch/job.rs"]
mod tests;
