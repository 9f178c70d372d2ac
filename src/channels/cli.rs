//! CLI channel: stdin/stdout shell for one intake conversation.

use std::io::Write;

use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use crate::intake::{
    AnswerShape, Category, ConversationEngine, Phase, RawAnswer, SessionState, Step, SubmitOutcome,
};

/// Turn a typed line into an answer for `step`.
///
/// Multi-select steps take option numbers or labels separated by commas.
/// A line that is not a complete selection goes through as free text, so
/// termination keywords still work there.
pub fn parse_cli_answer(step: &Step, line: &str) -> RawAnswer {
    if step.shape == AnswerShape::FreeText {
        return RawAnswer::Text(line.to_string());
    }

    let pieces: Vec<&str> = line
        .split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect();
    if pieces.is_empty() {
        return RawAnswer::Text(line.to_string());
    }

    let resolved: Option<Vec<String>> = pieces
        .iter()
        .map(|piece| resolve_category(piece).map(|c| c.label().to_string()))
        .collect();

    match resolved {
        Some(labels) => RawAnswer::Selection(labels),
        None => RawAnswer::Text(line.to_string()),
    }
}

fn resolve_category(piece: &str) -> Option<Category> {
    if let Ok(n) = piece.parse::<usize>() {
        return n.checked_sub(1).and_then(|i| Category::ALL.get(i).copied());
    }
    Category::ALL
        .into_iter()
        .find(|c| c.label().eq_ignore_ascii_case(piece))
}

/// Drives one `ConversationEngine` from a line reader, writing to `out`.
pub struct CliChannel<W> {
    out: W,
}

impl CliChannel<std::io::Stdout> {
    pub fn stdio() -> Self {
        Self {
            out: std::io::stdout(),
        }
    }
}

impl<W: Write> CliChannel<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// Run the conversation until it ends, finishes, or input runs out.
    pub async fn run<R>(
        &mut self,
        engine: &mut ConversationEngine,
        input: R,
    ) -> std::io::Result<Phase>
    where
        R: AsyncBufRead + Unpin,
    {
        let mut lines = input.lines();

        while let Some(step) = engine.current_step() {
            self.render_step(engine.state(), step)?;

            let Some(line) = lines.next_line().await? else {
                tracing::debug!("Input closed before the intake finished");
                break;
            };
            let answer = parse_cli_answer(step, line.trim_end_matches('\r'));

            if matches!(answer, RawAnswer::Selection(_)) {
                writeln!(
                    self.out,
                    "\nGenerating your personalized technical questions and assignments, please wait..."
                )?;
            }

            match engine.submit(answer).await {
                Ok(SubmitOutcome::Accepted) => {}
                Ok(SubmitOutcome::Rejected(reason)) => writeln!(self.out, "⚠️  {reason}")?,
                Ok(SubmitOutcome::Ended) => {
                    writeln!(self.out, "\n{}", engine.state().message)?;
                }
                Ok(SubmitOutcome::Finished) => self.render_results(engine.state())?,
                Err(e) => {
                    tracing::warn!(error = %e, "Submit refused");
                    break;
                }
            }
        }

        self.out.flush()?;
        Ok(engine.phase())
    }

    fn render_step(&mut self, state: &SessionState, step: &Step) -> std::io::Result<()> {
        writeln!(self.out, "\n[{}% complete] {}", state.progress_percent(), step.question)?;
        if step.shape == AnswerShape::MultiSelect {
            for (i, category) in Category::ALL.iter().enumerate() {
                writeln!(self.out, "  {}. {}", i + 1, category)?;
            }
            writeln!(self.out, "  (numbers or names, comma-separated)")?;
        }
        write!(self.out, "> ")?;
        self.out.flush()
    }

    fn render_results(&mut self, state: &SessionState) -> std::io::Result<()> {
        for set in &state.question_sets {
            writeln!(self.out, "\n{} Interview Questions", set.tech)?;
            for question in &set.questions {
                writeln!(self.out, "- {question}")?;
            }
        }
        for record in &state.assignments {
            writeln!(self.out, "\nAssignment Task: {}", record.category)?;
            writeln!(self.out, "{}", record.assignment)?;
        }
        writeln!(self.out, "\n{}", state.message)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;

    use super::*;
    use crate::config::GenerationConfig;
    use crate::error::LlmError;
    use crate::intake::{FAREWELL_MESSAGE, GenerationGateway, STEPS, StepKey};
    use crate::llm::{CompletionRequest, CompletionResponse, FinishReason, LlmProvider};

    struct CannedLlm;

    #[async_trait]
    impl LlmProvider for CannedLlm {
        fn model_name(&self) -> &str {
            "canned"
        }

        async fn complete(
            &self,
            request: CompletionRequest,
        ) -> Result<CompletionResponse, LlmError> {
            let content = if request.messages[0].content.contains("interview questions") {
                "1. Canned question"
            } else {
                "Canned assignment."
            };
            Ok(CompletionResponse {
                content: content.to_string(),
                input_tokens: 0,
                output_tokens: 0,
                finish_reason: FinishReason::Stop,
                response_id: None,
            })
        }
    }

    fn engine() -> ConversationEngine {
        let gateway = GenerationGateway::new(Arc::new(CannedLlm), GenerationConfig::default());
        ConversationEngine::new(Arc::new(gateway))
    }

    fn categories_step() -> &'static Step {
        STEPS.iter().find(|s| s.key == StepKey::Categories).unwrap()
    }

    #[test]
    fn free_text_passes_through() {
        assert_eq!(
            parse_cli_answer(&STEPS[0], "1, 2"),
            RawAnswer::Text("1, 2".into())
        );
    }

    #[test]
    fn selection_by_number_or_label() {
        let step = categories_step();
        assert_eq!(
            parse_cli_answer(step, "1, data science ,7"),
            RawAnswer::Selection(vec![
                "Backend Development".into(),
                "Data Science".into(),
                "Cloud Computing".into(),
            ])
        );
    }

    #[test]
    fn incomplete_selection_becomes_text() {
        let step = categories_step();
        assert_eq!(parse_cli_answer(step, "quit"), RawAnswer::Text("quit".into()));
        assert_eq!(parse_cli_answer(step, "1, 9"), RawAnswer::Text("1, 9".into()));
        assert_eq!(parse_cli_answer(step, "0"), RawAnswer::Text("0".into()));
        assert_eq!(parse_cli_answer(step, " , "), RawAnswer::Text(" , ".into()));
    }

    #[tokio::test]
    async fn cli_runs_full_intake() {
        let input: &[u8] = b"Jane Doe\njane@x.com\n(555) 123-4567\n3\nBackend Engineer\nRemote\nPython, SQL\n1\n";
        let mut engine = engine();
        let mut cli = CliChannel::new(Vec::new());

        let phase = cli.run(&mut engine, input).await.unwrap();
        assert_eq!(phase, Phase::Finished);

        let out = String::from_utf8(cli.out).unwrap();
        assert!(out.contains("[0% complete] What is your full name?"));
        assert!(out.contains("  1. Backend Development"));
        assert!(out.contains("please wait"));
        assert!(out.contains("Python Interview Questions"));
        assert!(out.contains("SQL Interview Questions"));
        assert!(out.contains("- Canned question"));
        assert!(out.contains("Assignment Task: Backend Development"));
        assert!(out.contains(FAREWELL_MESSAGE));
    }

    #[tokio::test]
    async fn cli_reports_rejections_and_retries() {
        let input: &[u8] = b"Jane\nnot-an-email\njane@x.com\nbye\n";
        let mut engine = engine();
        let mut cli = CliChannel::new(Vec::new());

        let phase = cli.run(&mut engine, input).await.unwrap();
        assert_eq!(phase, Phase::Ended);
        assert_eq!(engine.state().step, 2);

        let out = String::from_utf8(cli.out).unwrap();
        assert!(out.contains("Please enter a valid email address."));
        assert!(out.contains(FAREWELL_MESSAGE));
        assert!(!out.contains("How many years"));
    }

    #[tokio::test]
    async fn cli_stops_at_end_of_input() {
        let input: &[u8] = b"Jane\n";
        let mut engine = engine();
        let mut cli = CliChannel::new(Vec::new());
        let phase = cli.run(&mut engine, input).await.unwrap();
        assert_eq!(phase, Phase::Collecting);
        assert_eq!(engine.state().step, 1);
    }
}
