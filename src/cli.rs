//! Terminal front end: a line-oriented REPL over stdin/stderr.
//!
//! The top level mirrors the landing page (generate, login, FAQ, ...).
//! "generate" and "preferences" drop into nested loops for the wizard and
//! the title/post dialog.

use std::fmt::Display;

use secrecy::{ExposeSecret, SecretString};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, Lines};

use crate::app::{App, GenerateRoute};
use crate::auth::{MAX_STRENGTH, SignupForm, password_strength, strength_label};
use crate::error::{DialogError, WizardError};
use crate::generate::{DialogPhase, DialogState, GenerationDialog};
use crate::landing::{self, FaqAccordion};
use crate::preferences::{PreferenceWizard, Step, WizardState};

/// Top-level commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Help,
    Home,
    Faq(Option<usize>),
    Login(Option<String>),
    Signup,
    Logout,
    WhoAmI,
    Generate,
    Preferences,
    Subscribe(Option<String>),
    Quit,
}

impl Command {
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        let (word, rest) = split_word(line);
        let arg = (!rest.is_empty()).then(|| rest.to_string());
        let command = match word.trim_start_matches('/').to_ascii_lowercase().as_str() {
            "help" | "?" => Self::Help,
            "home" | "landing" => Self::Home,
            "faq" => Self::Faq(match arg {
                Some(n) => Some(n.parse::<usize>().ok()?.checked_sub(1)?),
                None => None,
            }),
            "login" => Self::Login(arg),
            "signup" => Self::Signup,
            "logout" => Self::Logout,
            "whoami" | "me" => Self::WhoAmI,
            "generate" | "gen" => Self::Generate,
            "preferences" | "prefs" => Self::Preferences,
            "subscribe" => Self::Subscribe(arg),
            "quit" | "exit" | "q" => Self::Quit,
            _ => return None,
        };
        Some(command)
    }
}

/// Commands inside the preference wizard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WizardCommand {
    Next,
    Back,
    Toggle(Vec<u64>),
    Description(String),
    Cta(String),
    Save,
    Show,
    Close,
}

impl WizardCommand {
    pub fn parse(line: &str) -> Option<Self> {
        let (word, rest) = split_word(line.trim());
        let command = match word.to_ascii_lowercase().as_str() {
            "next" | "n" => Self::Next,
            "back" | "b" => Self::Back,
            "toggle" | "t" => Self::Toggle(parse_ids(rest)?),
            "desc" | "description" => Self::Description(rest.to_string()),
            "cta" => Self::Cta(rest.to_string()),
            "save" | "submit" => Self::Save,
            "show" | "" => Self::Show,
            "close" | "cancel" | "quit" => Self::Close,
            // Bare ids toggle: "3 7".
            _ => Self::Toggle(parse_ids(line)?),
        };
        Some(command)
    }
}

/// Commands inside the generation dialog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DialogCommand {
    Title(String),
    Pick(usize),
    Refresh,
    Generate,
    Regenerate,
    Back,
    Copy,
    Show,
    Close,
}

impl DialogCommand {
    pub fn parse(line: &str) -> Option<Self> {
        let (word, rest) = split_word(line.trim());
        let command = match word.to_ascii_lowercase().as_str() {
            "title" => Self::Title(rest.to_string()),
            "pick" | "p" => Self::Pick(rest.parse::<usize>().ok()?.checked_sub(1)?),
            "refresh" => Self::Refresh,
            "generate" | "gen" | "g" => Self::Generate,
            "regenerate" | "again" | "r" => Self::Regenerate,
            "back" | "b" => Self::Back,
            "copy" | "c" => Self::Copy,
            "show" | "" => Self::Show,
            "close" | "cancel" | "quit" => Self::Close,
            _ => return None,
        };
        Some(command)
    }
}

fn split_word(line: &str) -> (&str, &str) {
    match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    }
}

fn parse_ids(raw: &str) -> Option<Vec<u64>> {
    let ids: Vec<u64> = raw
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|part| !part.is_empty())
        .map(str::parse)
        .collect::<Result<_, _>>()
        .ok()?;
    (!ids.is_empty()).then_some(ids)
}

fn warn_user(message: impl Display) {
    eprintln!("⚠️  {message}");
}

const HELP: &str = "\
Commands:
  generate            Create a LinkedIn post (runs the preference wizard first if needed)
  preferences         Review or change your content preferences
  login [email]       Log in
  signup              Create an account
  logout              Log out
  whoami              Show the logged-in user
  subscribe [email]   Subscribe to the newsletter
  home                Show the landing page
  faq [n]             Show the FAQ, expanding or collapsing entry n
  quit                Exit";

const WIZARD_HELP: &str = "\
  <id> [id...] | toggle <ids>   Select or unselect options
  next / back                   Move between steps
  desc <text> / cta <text>      Fill in the custom step
  save                          Save preferences (last step)
  close                         Leave the wizard";

const DIALOG_HELP: &str = "\
  title <text> / pick <n>   Set the title
  refresh                   Shuffle the suggestions
  generate                  Generate the post
  regenerate / back / copy  Work with the generated post
  close                     Leave the dialog";

/// The REPL, generic over its input so scripted sessions can drive it.
pub struct Repl<R> {
    app: App,
    lines: Lines<R>,
    faq: FaqAccordion,
    /// Read passwords from the terminal without echo instead of from `lines`.
    hide_passwords: bool,
}

impl<R: AsyncBufRead + Unpin> Repl<R> {
    pub fn new(app: App, input: R) -> Self {
        Self {
            app,
            lines: input.lines(),
            faq: FaqAccordion::default(),
            hide_passwords: false,
        }
    }

    /// Prompt for passwords on the terminal with echo off. Only meaningful
    /// when stdin is a TTY.
    pub fn with_hidden_passwords(mut self, hide: bool) -> Self {
        self.hide_passwords = hide;
        self
    }

    pub fn app(&self) -> &App {
        &self.app
    }

    /// Run until `quit` or end of input.
    pub async fn run(&mut self) -> anyhow::Result<()> {
        loop {
            let Some(line) = self.read_line("> ").await? else {
                break;
            };
            if line.is_empty() {
                continue;
            }
            let Some(command) = Command::parse(&line) else {
                warn_user(format!("Unknown command: {line} (type 'help')"));
                continue;
            };
            tracing::debug!(?command, "REPL command");
            if command == Command::Quit {
                break;
            }
            self.dispatch(command).await?;
        }
        eprintln!("👋 Bye");
        Ok(())
    }

    async fn dispatch(&mut self, command: Command) -> anyhow::Result<()> {
        match command {
            Command::Help => eprintln!("{HELP}"),
            Command::Home => eprintln!("{}", landing::render_landing(&self.faq)),
            Command::Faq(index) => {
                if let Some(index) = index {
                    self.faq.toggle(index);
                }
                eprintln!("{}", landing::render_faq(&self.faq));
            }
            Command::Login(email) => self.login(email).await?,
            Command::Signup => self.signup().await?,
            Command::Logout => {
                if let Err(e) = self.app.auth().logout().await {
                    warn_user(e);
                }
            }
            Command::WhoAmI => match self.app.session().current_user().await {
                Some(user) => eprintln!("[{}] {} <{}>", user.initial(), user.full_name, user.email),
                None => eprintln!("Not logged in"),
            },
            Command::Generate => self.generate().await?,
            Command::Preferences => {
                if self.app.session().is_authenticated().await {
                    if self.run_wizard().await? {
                        self.run_dialog().await?;
                    }
                } else {
                    warn_user("Please log in first");
                }
            }
            Command::Subscribe(email) => {
                let email = match email {
                    Some(email) => email,
                    None => self.read_line("Email: ").await?.unwrap_or_default(),
                };
                // The newsletter flow reports its own outcome.
                let _ = self.app.newsletter().subscribe(&email).await;
            }
            Command::Quit => {}
        }
        Ok(())
    }

    async fn login(&mut self, email: Option<String>) -> anyhow::Result<()> {
        let email = match email {
            Some(email) => email,
            None => self.read_line("Email: ").await?.unwrap_or_default(),
        };
        let password = self.read_secret("Password").await?;

        if self.app.auth().login(&email, &password).await.is_ok()
            && self.app.needs_preferences().await
        {
            eprintln!("ℹ️  Let's set up your content preferences first.");
            self.run_wizard().await?;
        }
        Ok(())
    }

    async fn signup(&mut self) -> anyhow::Result<()> {
        let full_name = self.read_line("Full name: ").await?.unwrap_or_default();
        let email = self.read_line("Email: ").await?.unwrap_or_default();
        let phone_number = self.read_line("Phone number: ").await?.unwrap_or_default();
        let zip_code = self.read_line("Zip code: ").await?.unwrap_or_default();
        let password = self.read_secret("Password").await?;
        let strength = password_strength(password.expose_secret());
        eprintln!(
            "   Password strength: {} ({strength}/{MAX_STRENGTH})",
            strength_label(strength)
        );
        let confirm = self.read_secret("Confirm password").await?;

        let form = SignupForm {
            full_name,
            email,
            phone_number,
            zip_code,
            password,
            confirm_password: confirm,
        };
        if self.app.auth().signup(&form).await.is_ok() {
            eprintln!("ℹ️  You can now log in with 'login {}'", form.email.trim());
        }
        Ok(())
    }

    async fn generate(&mut self) -> anyhow::Result<()> {
        match self.app.start_generation().await {
            GenerateRoute::TitleDialog => self.run_dialog().await?,
            GenerateRoute::PreferenceWizard => {
                if self.run_wizard().await? {
                    self.run_dialog().await?;
                }
            }
            GenerateRoute::LoginRequired | GenerateRoute::SessionExpired => {}
        }
        Ok(())
    }

    /// Drive a wizard until it closes. Returns whether preferences were saved.
    async fn run_wizard(&mut self) -> anyhow::Result<bool> {
        let wizard = self.app.preference_wizard(None);
        if let Err(e) = wizard.open().await {
            if !matches!(e, WizardError::SessionExpired) {
                warn_user(e);
            }
            return Ok(false);
        }
        wizard.wait_for_prefill().await;
        eprintln!("{WIZARD_HELP}");

        loop {
            let state = wizard.state().await;
            if !state.open {
                return Ok(false);
            }
            eprintln!("{}", render_wizard(&state));

            let Some(line) = self.read_line("wizard> ").await? else {
                wizard.close().await;
                return Ok(false);
            };
            let Some(command) = WizardCommand::parse(&line) else {
                warn_user(format!("Unknown wizard command: {line}"));
                continue;
            };
            match apply_wizard(&wizard, command).await {
                Ok(Some(saved)) => return Ok(saved),
                Ok(None) => {}
                Err(WizardError::SessionExpired) => return Ok(false),
                // Already reported through the notifier or shown inline.
                Err(WizardError::Api(_)) => {}
                Err(e) => warn_user(e),
            }
        }
    }

    async fn run_dialog(&mut self) -> anyhow::Result<()> {
        let dialog = self.app.generation_dialog(None);
        dialog.open().await;
        eprintln!("{DIALOG_HELP}");

        loop {
            eprintln!("{}", render_dialog(&dialog.state().await, dialog.is_copied().await));
            let Some(line) = self.read_line("post> ").await? else {
                dialog.close().await;
                return Ok(());
            };
            let Some(command) = DialogCommand::parse(&line) else {
                warn_user(format!("Unknown dialog command: {line}"));
                continue;
            };
            if command == DialogCommand::Close {
                dialog.close().await;
                return Ok(());
            }
            match apply_dialog(&dialog, command).await {
                Ok(()) => {}
                Err(DialogError::SessionExpired) => return Ok(()),
                // Reported through the notifier.
                Err(
                    DialogError::Api(_)
                    | DialogError::Clipboard(_)
                    | DialogError::EmptyTitle
                    | DialogError::NotLoggedIn,
                ) => {}
                Err(e) => warn_user(e),
            }
        }
    }

    async fn read_secret(&mut self, prompt: &str) -> anyhow::Result<SecretString> {
        if !self.hide_passwords {
            let line = self.read_line(&format!("{prompt}: ")).await?;
            return Ok(SecretString::from(line.unwrap_or_default()));
        }
        let prompt = prompt.to_string();
        let password = tokio::task::spawn_blocking(move || {
            dialoguer::Password::new()
                .with_prompt(prompt)
                .allow_empty_password(true)
                .interact()
        })
        .await??;
        Ok(SecretString::from(password))
    }

    async fn read_line(&mut self, prompt: &str) -> anyhow::Result<Option<String>> {
        eprint!("{prompt}");
        Ok(self
            .lines
            .next_line()
            .await?
            .map(|line| line.trim().to_string()))
    }
}

/// `Some(saved)` when the wizard is finished.
async fn apply_wizard(
    wizard: &PreferenceWizard,
    command: WizardCommand,
) -> Result<Option<bool>, WizardError> {
    match command {
        WizardCommand::Next => {
            wizard.next().await?;
        }
        WizardCommand::Back => {
            wizard.back().await?;
        }
        WizardCommand::Toggle(ids) => {
            for id in ids {
                wizard.toggle(id).await?;
            }
        }
        WizardCommand::Description(text) => wizard.set_fine_tune_description(text).await,
        WizardCommand::Cta(text) => wizard.set_modify_post_cta(text).await,
        WizardCommand::Save => {
            wizard.submit().await?;
            return Ok(Some(true));
        }
        WizardCommand::Show => {}
        WizardCommand::Close => {
            wizard.close().await;
            return Ok(Some(false));
        }
    }
    Ok(None)
}

async fn apply_dialog(dialog: &GenerationDialog, command: DialogCommand) -> Result<(), DialogError> {
    match command {
        DialogCommand::Title(title) => dialog.set_title(title).await,
        DialogCommand::Pick(index) => {
            dialog.select_suggestion(index).await?;
        }
        DialogCommand::Refresh => {
            eprintln!("⏳ Generating...");
            dialog.refresh_suggestions().await?;
        }
        DialogCommand::Generate => {
            eprintln!("⏳ Generating...");
            dialog.generate().await?;
        }
        DialogCommand::Regenerate => {
            eprintln!("⏳ Regenerating...");
            dialog.regenerate().await?;
        }
        DialogCommand::Back => dialog.back_to_title().await,
        DialogCommand::Copy => dialog.copy_to_clipboard().await?,
        DialogCommand::Show | DialogCommand::Close => {}
    }
    Ok(())
}

/// Plain-text view of the wizard.
pub fn render_wizard(state: &WizardState) -> String {
    let mut out = format!(
        "\n{}\n{}\n[{}] {:.0}%\n\n{}\n",
        state.title(),
        state.description(),
        progress_bar(state.progress_percent()),
        state.progress_percent(),
        state.step.label()
    );

    if state.step == Step::LAST {
        out.push_str(&format!(
            "  Fine-tune description: {}\n  Modify post CTA: {}\n",
            or_placeholder(&state.free_text.fine_tune_description),
            or_placeholder(&state.free_text.modify_post_cta),
        ));
    } else if state.loading {
        out.push_str("  Loading...\n");
    } else if state.items().is_empty() && state.error.is_none() {
        out.push_str("  No options available\n");
    } else {
        for item in state.items() {
            let mark = if state.is_selected(item.id) { 'x' } else { ' ' };
            out.push_str(&format!("  [{mark}] {:>3}  {}\n", item.id, item.name));
        }
    }

    if let Some(error) = &state.error {
        out.push_str(&format!("  ❌ {error}\n"));
    }
    out
}

/// Plain-text view of the dialog.
pub fn render_dialog(state: &DialogState, copied: bool) -> String {
    let mut out = format!("\n✨ {}\n", state.phase.heading());
    match (state.phase, &state.post) {
        (DialogPhase::Post, Some(post)) => {
            out.push_str(&format!("Based on the title: {}\n\n", post.title));
            for line in crate::generate::format_post(&post.body) {
                out.push_str(&format!("  {line}\n"));
            }
            if copied {
                out.push_str("\n  ✔ Copied!\n");
            }
        }
        _ => {
            out.push_str(&format!("Post title: {}\n\nSuggested titles:\n", or_placeholder(&state.title)));
            for (index, suggestion) in state.suggestions.iter().enumerate() {
                let mark = if state.is_chosen(suggestion) { '>' } else { ' ' };
                out.push_str(&format!(" {mark}{}. {suggestion}\n", index + 1));
            }
        }
    }
    out
}

fn progress_bar(percent: f32) -> String {
    const WIDTH: usize = 24;
    let filled = ((percent / 100.0) * WIDTH as f32).round() as usize;
    let filled = filled.min(WIDTH);
    format!("{}{}", "#".repeat(filled), "-".repeat(WIDTH - filled))
}

fn or_placeholder(text: &str) -> &str {
    if text.trim().is_empty() { "(empty)" } else { text }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::api::ApiClient;
    use crate::config::ClientConfig;
    use crate::generate::MemoryClipboard;
    use crate::notify::MemoryNotifier;
    use crate::session::SessionStore;

    #[test]
    fn parse_top_level() {
        assert_eq!(Command::parse("help"), Some(Command::Help));
        assert_eq!(Command::parse("/quit"), Some(Command::Quit));
        assert_eq!(Command::parse("faq 2"), Some(Command::Faq(Some(1))));
        assert_eq!(Command::parse("faq"), Some(Command::Faq(None)));
        assert_eq!(Command::parse("faq 0"), None);
        assert_eq!(
            Command::parse("login ada@example.com"),
            Some(Command::Login(Some("ada@example.com".into())))
        );
        assert_eq!(Command::parse("Generate"), Some(Command::Generate));
        assert_eq!(Command::parse("dance"), None);
    }

    #[test]
    fn parse_wizard_commands() {
        assert_eq!(WizardCommand::parse("next"), Some(WizardCommand::Next));
        assert_eq!(
            WizardCommand::parse("3 7"),
            Some(WizardCommand::Toggle(vec![3, 7]))
        );
        assert_eq!(
            WizardCommand::parse("toggle 1,2"),
            Some(WizardCommand::Toggle(vec![1, 2]))
        );
        assert_eq!(
            WizardCommand::parse("desc Friendly and direct"),
            Some(WizardCommand::Description("Friendly and direct".into()))
        );
        assert_eq!(WizardCommand::parse(""), Some(WizardCommand::Show));
        assert_eq!(WizardCommand::parse("toggle"), None);
        assert_eq!(WizardCommand::parse("bogus"), None);
    }

    #[test]
    fn parse_dialog_commands() {
        assert_eq!(DialogCommand::parse("pick 1"), Some(DialogCommand::Pick(0)));
        assert_eq!(DialogCommand::parse("pick 0"), None);
        assert_eq!(
            DialogCommand::parse("title Why Most LinkedIn Posts Fail"),
            Some(DialogCommand::Title("Why Most LinkedIn Posts Fail".into()))
        );
        assert_eq!(DialogCommand::parse("copy"), Some(DialogCommand::Copy));
        assert_eq!(DialogCommand::parse("what"), None);
    }

    #[test]
    fn wizard_view_shows_selection_marks() {
        let mut state = WizardState::default();
        state.options.insert(
            Step::ContentTypes,
            vec![
                crate::api::OptionItem {
                    id: 1,
                    name: "Stories".into(),
                },
                crate::api::OptionItem {
                    id: 2,
                    name: "How-tos".into(),
                },
            ],
        );
        state.selections.toggle(Step::ContentTypes, 2);

        let view = render_wizard(&state);
        assert!(view.contains("[ ]   1  Stories"));
        assert!(view.contains("[x]   2  How-tos"));
        assert!(view.contains("Step 1 of 6"));
    }

    #[test]
    fn progress_bar_bounds() {
        assert_eq!(progress_bar(0.0), "-".repeat(24));
        assert_eq!(progress_bar(100.0), "#".repeat(24));
        assert_eq!(progress_bar(150.0), "#".repeat(24));
    }

    #[tokio::test]
    async fn scripted_session_without_backend() {
        let notifier = Arc::new(MemoryNotifier::new());
        let config = ClientConfig {
            api_url: "http://127.0.0.1:9".into(),
            ..ClientConfig::default()
        };
        let client = Arc::new(ApiClient::new(&config).unwrap());
        let app = App::from_parts(
            config,
            client,
            SessionStore::in_memory(),
            notifier.clone(),
            Arc::new(MemoryClipboard::new()),
        );

        let script: &[u8] = b"help\nfaq 1\nwhoami\ngenerate\nnonsense\nquit\ngenerate\n";
        let mut repl = Repl::new(app, script);
        repl.run().await.unwrap();

        // Everything after `quit` is ignored.
        assert_eq!(notifier.messages(), vec!["Please log in to generate posts"]);
    }

    #[tokio::test]
    async fn scripted_passwords_come_from_input() {
        let config = ClientConfig {
            api_url: "http://127.0.0.1:9".into(),
            ..ClientConfig::default()
        };
        let client = Arc::new(ApiClient::new(&config).unwrap());
        let app = App::from_parts(
            config,
            client,
            SessionStore::in_memory(),
            Arc::new(MemoryNotifier::new()),
            Arc::new(MemoryClipboard::new()),
        );

        let script: &[u8] = b"  Secret123!  \nnext\n";
        let mut repl = Repl::new(app, script);
        assert!(!repl.hide_passwords);

        let password = repl.read_secret("Password").await.unwrap();
        assert_eq!(password.expose_secret(), "Secret123!");
        assert_eq!(repl.read_line("> ").await.unwrap().as_deref(), Some("next"));

        // Input exhausted: an empty password, not an error.
        assert_eq!(repl.read_secret("Password").await.unwrap().expose_secret(), "");
    }
}
