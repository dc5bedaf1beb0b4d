use anyhow::Result;

use crate::application::Transcript;
use crate::domain::{Case, Identity};

use super::super::Container;

pub struct CasesController<'a> {
    container: &'a Container,
}

impl<'a> CasesController<'a> {
    pub fn new(container: &'a Container) -> Self {
        Self { container }
    }

    pub async fn list(&self, uid: String) -> Result<String> {
        let identity = Identity::new(uid, None);
        let use_case = self.container.case_history_use_case();
        let cases = use_case.list(&identity).await?;
        Ok(self.format_case_list(&cases))
    }

    pub async fn transcript(&self, uid: String, case_id: String) -> Result<String> {
        let identity = Identity::new(uid, None);
        let use_case = self.container.case_history_use_case();
        let transcript = use_case.transcript(&identity, &case_id).await?;
        Ok(self.format_transcript(&transcript))
    }

    fn format_case_list(&self, cases: &[Case]) -> String {
        if cases.is_empty() {
            return "No cases recorded.".to_string();
        }

        let mut output = format!("{} cases:\n\n", cases.len());
        for case in cases {
            output.push_str(&format!("  {}\n", case.summary()));
            output.push_str(&format!(
                "    Started by: {}, at: {}\n",
                case.started_by(),
                case.created_at()
            ));
        }
        output
    }

    fn format_transcript(&self, transcript: &Transcript) -> String {
        let mut output = format!("Case {}\n", transcript.case.id());
        if let Some(analysis) = transcript.case.analysis() {
            output.push_str(&format!(
                "Diagnosis: {}\n",
                analysis.diagnosis.as_deref().unwrap_or("unknown")
            ));
        }
        output.push('\n');

        if transcript.messages.is_empty() {
            output.push_str("(no messages)\n");
        }
        for message in &transcript.messages {
            output.push_str(&format!(
                "[{}] {}: {}\n",
                message.created_at(),
                message.role(),
                message.text()
            ));
        }
        output
    }
}
