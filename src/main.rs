use std::io::Write;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;
use vedic_explorer::config::AppConfig;
use vedic_explorer::conversation::{Answer, ConversationSession};
use vedic_explorer::corpus::{CorpusRepository, Language};
use vedic_explorer::enrichment::groq::fallback_follow_ups;
use vedic_explorer::enrichment::{GroqClient, Translator};
use vedic_explorer::search::{RankingKind, SearchEngine};

const LOAD_FAILURE_MESSAGE: &str =
    "Could not load the teachings right now. Check the knowledge-base location and try again.";

struct Repl {
    engine: Arc<SearchEngine>,
    session: ConversationSession,
    groq: Arc<GroqClient>,
    translator: Arc<Translator>,
    ai_enabled: bool,
    translate_to: Option<Language>,
    last_answer: Option<Answer>,
}

enum Command {
    Quit,
    Reset,
    Lang(Language),
    Ai(bool),
    Translate(Option<Language>),
    Deeper,
    Help,
    Ask(String),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let config = AppConfig::load()?;

    tracing::info!("Knowledge base: {}", config.data_location);
    tracing::info!(
        "Language: {}, AI synthesis: {}",
        config.language,
        if config.ai_enabled { "on" } else { "off" }
    );

    // 1. Corpus cache, preloaded so the first question is fast:
    let repository = CorpusRepository::new(config.corpus_source());
    if let Err(e) = repository.initialize(&[Language::DEFAULT, config.language]).await {
        tracing::error!("Preload failed: {}", e);
        println!("{}", LOAD_FAILURE_MESSAGE);
    }

    // 2. Retrieval and collaborators:
    let engine = SearchEngine::new(repository);
    let groq = GroqClient::new(config.groq_api_key.clone(), &config.groq_api_url);
    let translator = Translator::new(&config.translate_url);

    let mut repl = Repl {
        engine,
        session: ConversationSession::new(config.language),
        groq,
        translator,
        ai_enabled: config.ai_enabled,
        translate_to: None,
        last_answer: None,
    };

    print_help();

    // 3. Read-eval loop:
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("\n[{}] > ", repl.session.language());
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };

        match parse_command(&line) {
            Ok(Command::Quit) => break,
            Ok(command) => repl.handle(command).await,
            Err(message) => println!("{}", message),
        }
    }

    tracing::info!("Session {} ended", repl.session.id());
    Ok(())
}

fn parse_command(line: &str) -> Result<Command, String> {
    let line = line.trim();
    if !line.starts_with('/') {
        return Ok(Command::Ask(line.to_string()));
    }

    let mut parts = line.split_whitespace();
    let name = parts.next().unwrap_or_default();
    let arg = parts.next();

    match (name, arg) {
        ("/quit" | "/exit", _) => Ok(Command::Quit),
        ("/reset", _) => Ok(Command::Reset),
        ("/help", _) => Ok(Command::Help),
        ("/deeper", _) => Ok(Command::Deeper),
        ("/lang", Some(value)) => value.parse().map(Command::Lang),
        ("/ai", Some("on")) => Ok(Command::Ai(true)),
        ("/ai", Some("off")) => Ok(Command::Ai(false)),
        ("/translate", Some("off")) => Ok(Command::Translate(None)),
        ("/translate", Some(value)) => value.parse().map(|l| Command::Translate(Some(l))),
        _ => Err(format!("Unknown command '{}'. Type /help for the list.", line)),
    }
}

fn print_help() {
    println!("Ask any question about the Srimad Bhagavatam. Commands:");
    println!("  /reset              start a new conversation");
    println!("  /lang en|hi         switch the knowledge-base language");
    println!("  /ai on|off          toggle AI synthesis (needs GROQ_API_KEY)");
    println!("  /translate en|hi|off  translate answers for display");
    println!("  /deeper             reflect further on the last answer (AI)");
    println!("  /quit               leave");
}

impl Repl {
    async fn handle(&mut self, command: Command) {
        match command {
            Command::Quit => {}
            Command::Help => print_help(),
            Command::Reset => {
                self.session.reset();
                self.groq.clear_cache();
                self.last_answer = None;
                println!("Conversation cleared.");
            }
            Command::Lang(language) => {
                self.session.set_language(language);
                println!("Knowledge base language: {}", language);
            }
            Command::Ai(on) => {
                if on && !self.groq.is_configured() {
                    println!("AI synthesis needs GROQ_API_KEY to be set.");
                } else {
                    self.ai_enabled = on;
                    println!("AI synthesis {}.", if on { "on" } else { "off" });
                }
            }
            Command::Translate(target) => {
                self.translate_to = target;
                match target {
                    Some(language) => println!("Answers will be shown in {}.", language),
                    None => println!("Translation off."),
                }
            }
            Command::Deeper => self.deeper().await,
            Command::Ask(question) => self.ask(&question).await,
        }
    }

    async fn ask(&mut self, question: &str) {
        let answer = match self.session.ask(&self.engine, question).await {
            Ok(Some(answer)) => answer,
            Ok(None) => return,
            Err(e) => {
                tracing::error!("Search failed: {}", e);
                println!("{}", LOAD_FAILURE_MESSAGE);
                return;
            }
        };

        self.print_answer(&answer).await;

        if self.ai_enabled {
            self.print_synthesis(&answer).await;
        }

        self.print_suggestions().await;
        self.last_answer = Some(answer);
    }

    async fn deeper(&self) {
        let Some(answer) = &self.last_answer else {
            println!("Ask a question first.");
            return;
        };
        if !self.ai_enabled {
            println!("AI synthesis is off. Use /ai on (needs GROQ_API_KEY).");
            return;
        }

        let result = &answer.result;
        match self
            .groq
            .deeper_insights(&result.description, std::slice::from_ref(&result.reference), self.session.language())
            .await
        {
            Ok(response) => {
                let content = self.display_text(&response.content).await;
                println!("\nInsight ({}):\n{}", response.model, content);
            }
            Err(e) => {
                tracing::warn!("Insight unavailable: {}", e);
                println!("\n{}", e.fallback_message());
            }
        }
    }

    async fn print_suggestions(&self) {
        let language = self.session.language();
        let suggestions = if self.ai_enabled {
            self.groq.follow_up_questions(self.session.history(), language).await
        } else {
            fallback_follow_ups(language)
        };

        println!("\nYou could ask next:");
        for suggestion in suggestions {
            println!("  • {}", suggestion);
        }
    }

    async fn print_answer(&self, answer: &Answer) {
        if answer.rewritten {
            tracing::debug!("Searched for: {}", answer.query);
        }
        if answer.kind != RankingKind::Matched {
            println!("(No close match; here is a related teaching.)");
        }

        let result = &answer.result;
        let excerpt = self.display_text(&result.excerpt).await;

        println!("\n{}", result.title);
        println!("{}\n", "-".repeat(result.title.chars().count().max(3)));
        println!("{}", excerpt);
        println!("\nReference: {} (confidence {}%)", result.reference, result.confidence);
    }

    async fn print_synthesis(&self, answer: &Answer) {
        // The current question and answer are already the last two turns.
        let history = self.session.history();
        let prior = &history[..history.len().saturating_sub(2)];

        match self
            .groq
            .query_ai(&answer.query, &answer.results, prior, self.session.language())
            .await
        {
            Ok(response) => {
                let content = self.display_text(&response.content).await;
                println!("\nSynthesis ({}):\n{}", response.model, content);
            }
            Err(e) => {
                tracing::warn!("Synthesis unavailable: {}", e);
                println!("\n{}", e.fallback_message());
            }
        }
    }

    async fn display_text(&self, text: &str) -> String {
        match self.translate_to {
            Some(target) => self.translator.translate(text, target).await,
            None => text.to_string(),
        }
    }
}
