#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStage {
    LoadingStudy,
    CheckingCache,
    LoadingCachedResult,
    Simulating,
    SavingResults,
    Completed,
}

impl RunStage {
    pub fn label(self) -> &'static str {
        match self {
            RunStage::LoadingStudy => "loading-study",
            RunStage::CheckingCache => "checking-cache",
            RunStage::LoadingCachedResult => "loading-cache",
            RunStage::Simulating => "simulating",
            RunStage::SavingResults => "saving",
            RunStage::Completed => "completed",
        }
    }
}

#[derive(Debug, Clone)]
pub struct RunProgressEvent {
    pub case_id: String,
    pub stage: RunStage,
    pub elapsed_wall_s: f64,
    pub message: Option<String>,
}

impl RunProgressEvent {
    pub fn stage(
        case_id: &str,
        stage: RunStage,
        elapsed_wall_s: f64,
        message: Option<String>,
    ) -> Self {
        Self {
            case_id: case_id.to_string(),
            stage,
            elapsed_wall_s,
            message,
        }
    }
}
