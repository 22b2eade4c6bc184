//! One render/input routine per survey step.
//!
//! Screens only read the controller's step, answers, and busy flag, and
//! only write through field updates and transitions.

use std::sync::Arc;

use anyhow::Result;
use colored::Colorize;
use strum::IntoEnumIterator;
use survey_core::answer::{
    FieldUpdate, RATING_RANGE, Segment, SpecExperience, StimulusFamiliarity,
    VibeCodingExperience, VocabGap, YesNo,
};
use survey_core::clarifying::ClarifyingQuestion;
use survey_core::config::SurveyConfig;
use survey_core::flow::{Step, SurveyController, TOTAL_STEPS};
use survey_core::submission::{SubmissionOutcome, SurveyBackend};

use crate::fault::{FAULT_NOTICE, FaultBoundary};
use crate::helper::{BACK, HINT, QUIT, SKIP};
use crate::input::LineInput;

const PROGRESS_WIDTH: usize = 28;

/// What the loop does after a screen turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Turn {
    Continue,
    Quit,
    Finished,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Back,
    Quit,
    Skip,
    Hint,
}

enum Reply<T> {
    Answer(T),
    Command(Command),
}

fn parse_reply(line: &str) -> Reply<String> {
    match line.trim() {
        BACK => Reply::Command(Command::Back),
        QUIT => Reply::Command(Command::Quit),
        SKIP => Reply::Command(Command::Skip),
        HINT => Reply::Command(Command::Hint),
        other => Reply::Answer(other.to_string()),
    }
}

/// Resolves a typed choice: its number, or its label or stored value
/// ignoring case.
fn pick<T: Copy + ToString>(text: &str, options: &[(T, String)]) -> Option<T> {
    if let Ok(n) = text.parse::<usize>() {
        return n.checked_sub(1).and_then(|i| options.get(i)).map(|(v, _)| *v);
    }
    options
        .iter()
        .find(|(value, label)| {
            label.eq_ignore_ascii_case(text) || value.to_string().eq_ignore_ascii_case(text)
        })
        .map(|(v, _)| *v)
}

fn progress_bar(step: Step, percent: f64) -> String {
    let filled = ((percent / 100.0) * PROGRESS_WIDTH as f64).round() as usize;
    format!(
        "[{}{}] step {} of {}",
        "#".repeat(filled.min(PROGRESS_WIDTH)),
        "-".repeat(PROGRESS_WIDTH - filled.min(PROGRESS_WIDTH)),
        step.index() + 1,
        TOTAL_STEPS
    )
}

/// Unwraps an answer or hands a command to the navigation handler.
macro_rules! answer {
    ($self:ident, $reply:expr) => {
        match $reply {
            Reply::Answer(value) => value,
            Reply::Command(command) => return $self.on_command(command),
        }
    };
}

pub struct SurveyApp<I> {
    controller: SurveyController,
    survey: SurveyConfig,
    backend: Arc<dyn SurveyBackend>,
    input: I,
    clear_screen: bool,
    outcome: Option<SubmissionOutcome>,
}

impl<I: LineInput> SurveyApp<I> {
    pub fn new(
        controller: SurveyController,
        survey: SurveyConfig,
        backend: Arc<dyn SurveyBackend>,
        input: I,
    ) -> Self {
        Self {
            controller,
            survey,
            backend,
            input,
            clear_screen: true,
            outcome: None,
        }
    }

    /// Keeps previous output on screen between steps.
    pub fn without_screen_clearing(mut self) -> Self {
        self.clear_screen = false;
        self
    }

    pub fn controller(&self) -> &SurveyController {
        &self.controller
    }

    pub fn outcome(&self) -> Option<&SubmissionOutcome> {
        self.outcome.as_ref()
    }

    /// Runs turns until the participant finishes or leaves.
    pub async fn run(&mut self) -> Result<Turn> {
        let mut boundary = FaultBoundary::new();
        loop {
            if boundary.has_fault() {
                println!();
                println!("{}", FAULT_NOTICE.red());
                let reply = self
                    .input
                    .read_line("Press Enter to try again, or type /quit to leave: ")?;
                match reply.as_deref().map(parse_reply) {
                    None | Some(Reply::Command(Command::Quit)) => return Ok(Turn::Quit),
                    _ => boundary.retry(),
                }
                continue;
            }

            match boundary.guard(self.turn()).await {
                Some(Turn::Continue) | None => {}
                Some(done) => return Ok(done),
            }
        }
    }

    /// Renders the current step and handles one round of its input.
    pub async fn turn(&mut self) -> Result<Turn> {
        if self.controller.take_scroll_to_top() && self.clear_screen {
            print!("\x1B[2J\x1B[H");
        }
        self.render_progress();

        match self.controller.step() {
            Step::Welcome => self.welcome(),
            Step::Intake => self.intake(),
            Step::Stimulus => self.stimulus(),
            Step::IntentCapture => self.intent_capture(),
            Step::ClarifyingQuestions => self.clarifying_questions(),
            Step::Reflection => self.reflection().await,
            Step::ThankYou => Ok(self.thank_you()),
        }
    }

    // ============================================================================
    // Screens
    // ============================================================================

    fn welcome(&mut self) -> Result<Turn> {
        let copy = &self.survey.copy;
        println!("{}", copy.welcome.title.bright_magenta().bold());
        println!("{}", copy.welcome.subtitle);
        println!();
        println!("{}", copy.consent_statement.bright_black());
        println!();

        let options = [(YesNo::Yes, "Yes, I agree".to_string()), (YesNo::No, "No".to_string())];
        let current = self.controller.answers().consent.then_some(YesNo::Yes);
        let consent = answer!(self, self.choose("Do you agree to take part?", &options, current)?);
        self.controller
            .update_field(FieldUpdate::Consent(consent == YesNo::Yes))?;

        if consent == YesNo::No {
            println!("{}", "Consent is needed to start. Type /quit to leave.".yellow());
            return Ok(Turn::Continue);
        }
        self.advance()
    }

    fn intake(&mut self) -> Result<Turn> {
        println!("{}", self.survey.copy.intake.title.bright_magenta().bold());
        println!();

        let current = self.controller.answers().first_name.clone();
        let name = answer!(self, self.ask_text("First name", &current)?);
        self.controller.update_field(FieldUpdate::FirstName(name))?;

        let options: Vec<_> = Segment::iter().map(|s| (s, s.label().to_string())).collect();
        let current = self.controller.answers().segment;
        let segment = answer!(self, self.choose("Which best describes your work?", &options, current)?);
        self.controller.update_field(FieldUpdate::Segment(segment))?;

        let options: Vec<_> = SpecExperience::iter()
            .map(|s| (s, s.label().to_string()))
            .collect();
        let current = self.controller.answers().has_written_specs;
        let specs = answer!(
            self,
            self.choose("Have you ever written requirements or specs?", &options, current)?
        );
        self.controller.update_field(FieldUpdate::SpecExperience(specs))?;

        let options: Vec<_> = VibeCodingExperience::iter()
            .map(|v| (v, v.label().to_string()))
            .collect();
        let current = self.controller.answers().vibe_coding_experience;
        let vibe = answer!(
            self,
            self.choose("Experience with \"vibe coding\" tools?", &options, current)?
        );
        self.controller
            .update_field(FieldUpdate::VibeCodingExperience(vibe))?;

        self.advance()
    }

    fn stimulus(&mut self) -> Result<Turn> {
        let Some(stimulus) = self
            .survey
            .stimulus(&self.controller.answers().stimulus)
            .or_else(|| self.survey.default_stimulus())
            .cloned()
        else {
            anyhow::bail!("survey '{}' has no stimuli", self.survey.id);
        };

        println!("{}", stimulus.name.bright_magenta().bold());
        println!("{}", stimulus.description);
        println!();

        if self.controller.answers().stimulus != stimulus.id {
            self.controller
                .update_field(FieldUpdate::Stimulus(stimulus.id.clone()))?;
        }

        let options: Vec<_> = StimulusFamiliarity::iter()
            .map(|f| (f, f.to_string()))
            .collect();
        let current = self.controller.answers().stimulus_familiarity;
        let familiarity = answer!(
            self,
            self.choose(&stimulus.familiarity_question, &options, current)?
        );
        self.controller
            .update_field(FieldUpdate::StimulusFamiliarity(familiarity))?;

        self.advance()
    }

    fn intent_capture(&mut self) -> Result<Turn> {
        let copy = &self.survey.copy;
        println!("{}", copy.intent_capture.title.bright_magenta().bold());
        println!("{}", copy.intent_capture.subtitle);
        println!("{}", format!("Type {} for a few prompts.", HINT).bright_black());
        println!();

        loop {
            let current = self.controller.answers().intent_description.clone();
            let label = self.survey.copy.intent_placeholder.clone();
            match self.ask_text(&label, &current)? {
                Reply::Command(Command::Hint) => {
                    for hint in &self.survey.copy.hints {
                        println!("  {}", format!("- {}", hint).yellow());
                    }
                    self.controller.update_field(FieldUpdate::HintExpanded(true))?;
                }
                Reply::Command(command) => return self.on_command(command),
                Reply::Answer(text) => {
                    self.controller
                        .update_field(FieldUpdate::IntentDescription(text))?;
                    if self.controller.can_advance() {
                        return self.advance();
                    }
                    println!(
                        "{}",
                        "Please write a little more (at least 10 characters).".yellow()
                    );
                }
            }
        }
    }

    fn clarifying_questions(&mut self) -> Result<Turn> {
        let questions: Vec<&'static ClarifyingQuestion> = self
            .controller
            .answers()
            .clarifying_questions_shown
            .iter()
            .filter_map(|id| ClarifyingQuestion::by_id(id))
            .collect();

        if questions.is_empty() {
            return self.advance();
        }

        let copy = &self.survey.copy;
        println!("{}", copy.clarifying_questions.title.bright_magenta().bold());
        println!("{}", copy.clarifying_questions.subtitle);
        println!(
            "{}",
            format!("Type {} to {}.", SKIP, copy.clarifying_skip_label.to_lowercase())
                .bright_black()
        );

        for question in questions {
            println!();
            println!("{}", question.question_text.bold());
            println!("{}", question.placeholder_text.bright_black());
            let current = self
                .controller
                .answers()
                .clarifying_responses
                .get(question.id)
                .cloned()
                .unwrap_or_default();
            match self.ask_text("Answer (optional)", &current)? {
                Reply::Command(Command::Skip) => {
                    self.controller.skip_clarifying()?;
                    return Ok(Turn::Continue);
                }
                Reply::Command(command) => return self.on_command(command),
                Reply::Answer(text) if text.is_empty() => {}
                Reply::Answer(text) => {
                    self.controller.update_field(FieldUpdate::ClarifyingResponse {
                        question_id: question.id.to_string(),
                        text,
                    })?;
                }
            }
        }

        self.advance()
    }

    async fn reflection(&mut self) -> Result<Turn> {
        let copy = &self.survey.copy;
        println!("{}", copy.reflection.title.bright_magenta().bold());
        println!("{}", copy.reflection.subtitle);
        println!();

        let options: Vec<_> = RATING_RANGE.map(|r| (r, r.to_string())).collect();
        let current = self.controller.answers().difficulty_rating;
        let rating = answer!(
            self,
            self.choose(
                "How easy or hard was it to describe the app you wanted? (1 = Very Easy, 5 = Very Hard)",
                &options,
                current,
            )?
        );
        self.controller
            .update_field(FieldUpdate::DifficultyRating(Some(rating)))?;

        let options: Vec<_> = VocabGap::iter().map(|v| (v, v.to_string())).collect();
        let current = self.controller.answers().vocab_gap;
        let gap = answer!(
            self,
            self.choose(
                "Did you feel like you were missing vocabulary or concepts?",
                &options,
                current,
            )?
        );
        self.controller.update_field(FieldUpdate::VocabGap(gap))?;

        if gap == VocabGap::Yes {
            let current = self.controller.answers().difficulty_description.clone();
            let text = answer!(self, self.ask_text("What felt hard to express?", &current)?);
            self.controller
                .update_field(FieldUpdate::DifficultyDescription(text))?;
        }

        let current = self.controller.answers().other_thoughts.clone();
        let text = answer!(
            self,
            self.ask_text("Anything else you'd like to share? (optional)", &current)?
        );
        self.controller.update_field(FieldUpdate::OtherThoughts(text))?;

        let options: Vec<_> = YesNo::iter().map(|v| (v, v.to_string())).collect();
        let current = self.controller.answers().follow_up_interest;
        let follow_up = answer!(
            self,
            self.choose(
                "Would you be open to a 15-minute follow-up conversation?",
                &options,
                current,
            )?
        );
        self.controller
            .update_field(FieldUpdate::FollowUpInterest(follow_up))?;

        if follow_up == YesNo::Yes {
            let current = self.controller.answers().email.clone();
            let email = answer!(self, self.ask_text("Email address", &current)?);
            self.controller.update_field(FieldUpdate::Email(email))?;
        }

        if !self.controller.can_submit() {
            return Ok(Turn::Continue);
        }

        println!();
        println!("{}", "Submitting your responses...".bright_black());
        let outcome = self.controller.submit(self.backend.as_ref()).await?;
        self.outcome = Some(outcome);
        Ok(Turn::Continue)
    }

    fn thank_you(&mut self) -> Turn {
        let copy = &self.survey.copy;
        println!("{}", copy.thank_you.title.bright_green().bold());
        println!("{}", copy.thank_you.subtitle);
        if self.controller.answers().follow_up_interest == Some(YesNo::Yes) {
            println!("{}", copy.thank_you_follow_up.bright_black());
        }
        Turn::Finished
    }

    // ============================================================================
    // Prompts and navigation
    // ============================================================================

    fn render_progress(&self) {
        let step = self.controller.step();
        if step == Step::Welcome || step.is_terminal() {
            return;
        }
        println!();
        println!(
            "{}",
            progress_bar(step, self.controller.compute_progress()).bright_black()
        );
        println!();
    }

    fn read(&mut self, prompt: &str) -> Result<Reply<String>> {
        Ok(match self.input.read_line(prompt)? {
            Some(line) => parse_reply(&line),
            None => Reply::Command(Command::Quit),
        })
    }

    /// Free-text prompt. Pressing Enter keeps the current value.
    fn ask_text(&mut self, label: &str, current: &str) -> Result<Reply<String>> {
        self.input.set_choices(Vec::new());
        if !current.is_empty() {
            println!("{}", format!("(Enter keeps: {})", current).bright_black());
        }
        Ok(match self.read(&format!("{}: ", label))? {
            Reply::Answer(text) if text.is_empty() => Reply::Answer(current.to_string()),
            other => other,
        })
    }

    /// Numbered choice prompt. Pressing Enter keeps the current choice.
    fn choose<T: Copy + ToString>(
        &mut self,
        question: &str,
        options: &[(T, String)],
        current: Option<T>,
    ) -> Result<Reply<T>> {
        println!("{}", question.bold());
        for (i, (value, label)) in options.iter().enumerate() {
            let marker = match current {
                Some(c) if c.to_string() == value.to_string() => "*",
                _ => " ",
            };
            println!(" {} {}. {}", marker, i + 1, label);
        }
        self.input
            .set_choices(options.iter().map(|(_, label)| label.clone()).collect());

        loop {
            match self.read("> ")? {
                Reply::Answer(text) if text.is_empty() => {
                    if let Some(c) = current {
                        return Ok(Reply::Answer(c));
                    }
                }
                Reply::Answer(text) => {
                    if let Some(choice) = pick(&text, options) {
                        return Ok(Reply::Answer(choice));
                    }
                }
                Reply::Command(command @ (Command::Back | Command::Quit)) => {
                    return Ok(Reply::Command(command));
                }
                Reply::Command(_) => {}
            }
            println!(
                "{}",
                format!("Please enter a number from 1 to {}.", options.len()).yellow()
            );
        }
    }

    fn advance(&mut self) -> Result<Turn> {
        match self.controller.advance() {
            Ok(_) => Ok(Turn::Continue),
            Err(e) if e.is_blocked() => {
                println!("{}", e.to_string().yellow());
                Ok(Turn::Continue)
            }
            Err(e) => Err(e.into()),
        }
    }

    fn on_command(&mut self, command: Command) -> Result<Turn> {
        match command {
            Command::Back => match self.controller.retreat() {
                Ok(_) => Ok(Turn::Continue),
                Err(e) if e.is_blocked() => {
                    println!("{}", e.to_string().yellow());
                    Ok(Turn::Continue)
                }
                Err(e) => Err(e.into()),
            },
            Command::Quit => {
                println!(
                    "{}",
                    "Your progress is saved. Run the survey again to pick up where you left off."
                        .bright_green()
                );
                Ok(Turn::Quit)
            }
            Command::Skip | Command::Hint => {
                println!("{}", "That command is not available here.".bright_black());
                Ok(Turn::Continue)
            }
        }
    }
}
