use anyhow::Result;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};

use crate::application::{Access, ChatOpen, ChatSession, Destination, Route, SendOutcome};
use crate::domain::{ChatMessage, Identity, Role};

use super::super::Container;

pub struct ChatController<'a> {
    container: &'a Container,
}

impl<'a> ChatController<'a> {
    pub fn new(container: &'a Container) -> Self {
        Self { container }
    }

    pub async fn chat(&self, uid: String, email: Option<String>) -> Result<String> {
        let identity = Identity::new(uid, email);

        let access = self
            .container
            .guards(Route::Chat)
            .evaluate(Some(&identity))
            .await?;
        if let Access::Redirect(destination) = access {
            return Ok(format_redirect(destination, &identity));
        }

        let use_case = self.container.chat_session_use_case();
        let session = match use_case.open(&identity).await? {
            ChatOpen::Ready(session) => session,
            ChatOpen::ProfileRequired => {
                return Ok(format_redirect(Destination::ProfileSetup, &identity))
            }
        };

        let input = BufReader::new(tokio::io::stdin());
        let summary = run_repl(&session, input, tokio::io::stdout()).await?;
        session.close();
        Ok(summary)
    }
}

/// Reads one submission per line until EOF or `/quit`, printing every new
/// thread entry after each send.
pub async fn run_repl<R, W>(session: &ChatSession, input: R, mut output: W) -> Result<String>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    output
        .write_all(
            format!(
                "SwasthyaAI, case {}. Describe your symptoms (/quit to leave).\n",
                session.case_id()
            )
            .as_bytes(),
        )
        .await?;

    let mut shown = render_new(&session.messages(), 0, &mut output).await?;
    let mut lines = input.lines();

    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line == "/quit" || line == "/exit" {
            break;
        }

        match session.send_user_message(line).await? {
            SendOutcome::Ignored => continue,
            SendOutcome::Busy => {
                output.write_all(b"(still waiting for the last reply)\n").await?;
            }
            SendOutcome::Sent { .. } | SendOutcome::Failed => {}
        }

        shown = render_new(&session.messages(), shown, &mut output).await?;
        output.flush().await?;
    }
    output.flush().await?;

    let mut summary = format!(
        "Case {} closed with {} messages.",
        session.case_id(),
        session.messages().len()
    );
    if let Some(case) = session.current_case().await? {
        if let Some(analysis) = case.analysis() {
            summary.push_str(&format!(
                "\nDiagnosis: {}",
                analysis.diagnosis.as_deref().unwrap_or("unknown")
            ));
            if let Some(urgency) = analysis.urgency {
                summary.push_str(&format!("\nUrgency:   {}", urgency.as_str()));
            }
            for remedy in &analysis.remedies {
                summary.push_str(&format!("\n  - {}", remedy));
            }
            for suggestion in &analysis.suggestions {
                summary.push_str(&format!("\n  * {}", suggestion));
            }
        }
    }
    Ok(summary)
}

async fn render_new<W>(messages: &[ChatMessage], shown: usize, output: &mut W) -> Result<usize>
where
    W: AsyncWrite + Unpin,
{
    for message in messages.iter().skip(shown) {
        output.write_all(format_message(message).as_bytes()).await?;
    }
    Ok(messages.len().max(shown))
}

fn format_message(message: &ChatMessage) -> String {
    let speaker = match message.role() {
        Role::User => "you",
        Role::Bot => "swasthya",
        Role::System => "system",
    };
    format!("{}> {}\n", speaker, message.text())
}

fn format_redirect(destination: Destination, identity: &Identity) -> String {
    match destination {
        Destination::Login => "Not signed in: redirecting to /login.".to_string(),
        Destination::ProfileSetup => format!(
            "No profile for {uid}: redirecting to /profile-setup.\n\
             Run `swasthya profile-setup --uid {uid}` first.",
            uid = identity.uid()
        ),
    }
}
