use std::fmt;
use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

use chrono::Utc;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tokio::time::{Instant, interval_at};
use tracing_subscriber::EnvFilter;

use fiche_core::model::{
    CatalogError, DEFAULT_QUESTION_COUNT, DEFAULT_TIME_LIMIT_MIN, ExamConfig, ExamResult,
    FlatTopic, QuestionKind, TopicKey,
};
use services::{AppServices, Clock, ExamError, ExamSession, QuizSession, QuizStep};
use storage::Storage;

/// Presentation threshold; results below it are still recorded.
const PASS_SCORE: u32 = 70;

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    MissingPositional { name: &'static str },
    UnexpectedPositional(String),
    InvalidNumber { flag: &'static str, raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::MissingPositional { name } => write!(f, "missing <{name}> argument"),
            ArgsError::UnexpectedPositional(arg) => write!(f, "unexpected argument: {arg}"),
            ArgsError::InvalidNumber { flag, raw } => write!(f, "invalid {flag} value: {raw}"),
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

fn parse_number(flag: &'static str, raw: String) -> Result<u32, ArgsError> {
    raw.parse().map_err(|_| ArgsError::InvalidNumber { flag, raw })
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p app -- overview");
    eprintln!("  cargo run -p app -- read <certification> <category> <topic> [--complete] [--favorite]");
    eprintln!("  cargo run -p app -- quiz <certification> <category> <topic>");
    eprintln!("  cargo run -p app -- exam <certification> [--questions <n>] [--time <minutes>] [--categories <a,b,...>]");
    eprintln!("  cargo run -p app -- history [certification]");
    eprintln!("  cargo run -p app -- freeze");
    eprintln!();
    eprintln!("Common flags:");
    eprintln!("  --data-dir <dir>   where persisted records live (default fiche-data)");
    eprintln!("  --catalog <file>   catalog JSON file (default catalog.json)");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  FICHE_DATA_DIR, FICHE_CATALOG, RUST_LOG");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Overview,
    Read,
    Quiz,
    Exam,
    History,
    Freeze,
}

impl Command {
    fn from_arg(arg: &str) -> Option<Self> {
        match arg {
            "overview" => Some(Self::Overview),
            "read" => Some(Self::Read),
            "quiz" => Some(Self::Quiz),
            "exam" => Some(Self::Exam),
            "history" => Some(Self::History),
            "freeze" => Some(Self::Freeze),
            _ => None,
        }
    }
}

struct CommonArgs {
    data_dir: PathBuf,
    catalog: PathBuf,
}

impl CommonArgs {
    fn from_env() -> Self {
        let data_dir = std::env::var("FICHE_DATA_DIR")
            .ok()
            .map_or_else(|| PathBuf::from("fiche-data"), PathBuf::from);
        let catalog = std::env::var("FICHE_CATALOG")
            .ok()
            .map_or_else(|| PathBuf::from("catalog.json"), PathBuf::from);
        Self { data_dir, catalog }
    }

    /// Consume a shared flag. Returns false when the argument is not one.
    fn consume(
        &mut self,
        arg: &str,
        args: &mut impl Iterator<Item = String>,
    ) -> Result<bool, ArgsError> {
        match arg {
            "--data-dir" => {
                self.data_dir = PathBuf::from(require_value(args, "--data-dir")?);
                Ok(true)
            }
            "--catalog" => {
                self.catalog = PathBuf::from(require_value(args, "--catalog")?);
                Ok(true)
            }
            "--help" | "-h" => {
                print_usage();
                std::process::exit(0);
            }
            _ => Ok(false),
        }
    }
}

struct TopicArgs {
    certification: String,
    category: String,
    topic: String,
}

impl TopicArgs {
    fn from_positionals(positionals: Vec<String>) -> Result<Self, ArgsError> {
        let mut drain = positionals.into_iter();
        let certification = drain.next().ok_or(ArgsError::MissingPositional {
            name: "certification",
        })?;
        let category = drain
            .next()
            .ok_or(ArgsError::MissingPositional { name: "category" })?;
        let topic = drain
            .next()
            .ok_or(ArgsError::MissingPositional { name: "topic" })?;
        if let Some(extra) = drain.next() {
            return Err(ArgsError::UnexpectedPositional(extra));
        }
        Ok(Self {
            certification,
            category,
            topic,
        })
    }
}

struct ReadArgs {
    common: CommonArgs,
    selector: TopicArgs,
    complete: bool,
    favorite: bool,
}

struct ExamArgs {
    common: CommonArgs,
    certification: String,
    questions: Option<u32>,
    time: Option<u32>,
    categories: Option<Vec<String>>,
}

fn parse_overview(args: &mut impl Iterator<Item = String>) -> Result<CommonArgs, ArgsError> {
    let mut common = CommonArgs::from_env();
    while let Some(arg) = args.next() {
        if !common.consume(&arg, args)? {
            return Err(ArgsError::UnknownArg(arg));
        }
    }
    Ok(common)
}

fn parse_read(args: &mut impl Iterator<Item = String>) -> Result<ReadArgs, ArgsError> {
    let mut common = CommonArgs::from_env();
    let mut positionals = Vec::new();
    let mut complete = false;
    let mut favorite = false;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--complete" => complete = true,
            "--favorite" => favorite = true,
            other => {
                if common.consume(other, args)? {
                    continue;
                }
                if other.starts_with('-') {
                    return Err(ArgsError::UnknownArg(arg));
                }
                positionals.push(arg);
            }
        }
    }

    Ok(ReadArgs {
        common,
        selector: TopicArgs::from_positionals(positionals)?,
        complete,
        favorite,
    })
}

fn parse_quiz(
    args: &mut impl Iterator<Item = String>,
) -> Result<(CommonArgs, TopicArgs), ArgsError> {
    let mut common = CommonArgs::from_env();
    let mut positionals = Vec::new();

    while let Some(arg) = args.next() {
        if common.consume(&arg, args)? {
            continue;
        }
        if arg.starts_with('-') {
            return Err(ArgsError::UnknownArg(arg));
        }
        positionals.push(arg);
    }

    Ok((common, TopicArgs::from_positionals(positionals)?))
}

fn parse_exam(args: &mut impl Iterator<Item = String>) -> Result<ExamArgs, ArgsError> {
    let mut common = CommonArgs::from_env();
    let mut positionals = Vec::new();
    let mut questions = None;
    let mut time = None;
    let mut categories = None;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--questions" => {
                let raw = require_value(args, "--questions")?;
                questions = Some(parse_number("--questions", raw)?);
            }
            "--time" => {
                let raw = require_value(args, "--time")?;
                time = Some(parse_number("--time", raw)?);
            }
            "--categories" => {
                let raw = require_value(args, "--categories")?;
                categories = Some(
                    raw.split(',')
                        .map(str::trim)
                        .filter(|part| !part.is_empty())
                        .map(str::to_owned)
                        .collect(),
                );
            }
            other => {
                if common.consume(other, args)? {
                    continue;
                }
                if other.starts_with('-') {
                    return Err(ArgsError::UnknownArg(arg));
                }
                positionals.push(arg);
            }
        }
    }

    let mut drain = positionals.into_iter();
    let certification = drain.next().ok_or(ArgsError::MissingPositional {
        name: "certification",
    })?;
    if let Some(extra) = drain.next() {
        return Err(ArgsError::UnexpectedPositional(extra));
    }

    Ok(ExamArgs {
        common,
        certification,
        questions,
        time,
        categories,
    })
}

fn parse_history(
    args: &mut impl Iterator<Item = String>,
) -> Result<(CommonArgs, Option<String>), ArgsError> {
    let mut common = CommonArgs::from_env();
    let mut positionals = Vec::new();

    while let Some(arg) = args.next() {
        if common.consume(&arg, args)? {
            continue;
        }
        if arg.starts_with('-') {
            return Err(ArgsError::UnknownArg(arg));
        }
        positionals.push(arg);
    }

    let mut drain = positionals.into_iter();
    let certification = drain.next();
    if let Some(extra) = drain.next() {
        return Err(ArgsError::UnexpectedPositional(extra));
    }
    Ok((common, certification))
}

fn parse_freeze(args: &mut impl Iterator<Item = String>) -> Result<CommonArgs, ArgsError> {
    parse_overview(args)
}

fn report_args_error(e: ArgsError) -> ArgsError {
    eprintln!("{e}");
    print_usage();
    e
}

fn build_services(common: &CommonArgs) -> Result<AppServices, Box<dyn std::error::Error>> {
    tracing::debug!(
        "data dir {}, catalog {}",
        common.data_dir.display(),
        common.catalog.display()
    );
    let storage = Storage::json_file(&common.data_dir)?;
    Ok(AppServices::new(&common.catalog, &storage, Clock::default_clock())?)
}

//
// ─── OUTPUT HELPERS ────────────────────────────────────────────────────────────
//

fn input_lines() -> Lines<BufReader<Stdin>> {
    BufReader::new(tokio::io::stdin()).lines()
}

fn prompt(text: &str) -> std::io::Result<()> {
    print!("{text}");
    std::io::stdout().flush()
}

fn format_duration(secs: u32) -> String {
    format!("{}m{:02}s", secs / 60, secs % 60)
}

fn format_selection(selected: &[String]) -> String {
    if selected.is_empty() {
        "(none)".to_owned()
    } else {
        selected.join(", ")
    }
}

fn format_result(result: &ExamResult) -> String {
    let verdict = if result.score() >= PASS_SCORE { "pass" } else { "fail" };
    format!(
        "{}  {}  {}% ({}/{})  {}  {verdict}",
        result.date().format("%Y-%m-%d %H:%M"),
        result.certification_id(),
        result.score(),
        result.correct_answers(),
        result.total_questions(),
        format_duration(result.time_used()),
    )
}

fn kind_hint(kind: QuestionKind) -> &'static str {
    match kind {
        QuestionKind::SingleChoice => "pick one",
        QuestionKind::MultipleChoice => "pick all that apply",
    }
}

fn neighbor_hint(topic: &FlatTopic) -> String {
    format!(
        "{} ({} {} {})",
        topic.topic_title(),
        topic.certification_id(),
        topic.category_id(),
        topic.topic_id()
    )
}

/// Resolve a topic selector against the catalog, returning the whole
/// flattened navigation list plus the topic's position in it.
fn resolve_topic(
    services: &AppServices,
    selector: &TopicArgs,
) -> Result<(Vec<FlatTopic>, usize), CatalogError> {
    let certification = services.catalog().certification(&selector.certification)?;
    certification.category(&selector.category)?;

    let key = TopicKey::compose(
        &selector.certification,
        &selector.category,
        &selector.topic,
    );
    let index = certification
        .position(&key)
        .ok_or_else(|| CatalogError::UnknownTopic(selector.topic.clone()))?;
    Ok((certification.flatten(), index))
}

//
// ─── COMMANDS ──────────────────────────────────────────────────────────────────
//

fn run_overview(services: &AppServices) {
    for certification in services.catalog().certifications() {
        let done = services.progress().certification_progress(certification.id());
        println!(
            "{} ({}): {done}/{} topics completed",
            certification.title(),
            certification.id(),
            certification.topic_count()
        );
        for category in certification.categories() {
            let done = services
                .progress()
                .category_progress(certification.id(), category.id());
            println!(
                "  {} ({}): {done}/{}",
                category.title(),
                category.id(),
                category.topics().len()
            );
        }
    }

    let streaks = services.streaks();
    println!();
    let today = if streaks.is_active_today() { ", active today" } else { "" };
    println!(
        "Streak: {} day(s), best {}{today}",
        streaks.current_streak(),
        streaks.best_streak()
    );
    if streaks.can_use_freeze() {
        println!("A streak freeze is available this week.");
    }

    let history = services.exam_history();
    let results = history.all();
    println!();
    if results.is_empty() {
        println!("No exams taken yet.");
    } else {
        println!(
            "Recent exams (average {:.0}%, best {}%):",
            history.average_score(None),
            history.best_score(None)
        );
        for result in results.iter().take(5) {
            println!("  {}", format_result(result));
        }
    }
}

async fn run_read(
    services: &AppServices,
    args: &ReadArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let (flat, index) = resolve_topic(services, &args.selector)?;
    let topic = &flat[index];

    let markdown = services.content().load_markdown(topic).await.map_err(|e| {
        eprintln!("fiche unavailable, source: {}", topic.markdown_url());
        e
    })?;
    println!("{markdown}");

    let progress = services.progress();
    progress.set_last_visited(topic.key().clone());
    if args.complete {
        let now = progress.toggle_completed(topic.key().clone());
        println!("completed: {}", if now { "yes" } else { "no" });
    }
    if args.favorite {
        let now = progress.toggle_favorite(topic.key().clone());
        println!("favorite: {}", if now { "yes" } else { "no" });
    }
    if services.streaks().record_activity() {
        println!("Streak: {} day(s).", services.streaks().current_streak());
    }

    if index > 0 {
        println!("previous: {}", neighbor_hint(&flat[index - 1]));
    }
    if index + 1 < flat.len() {
        println!("next: {}", neighbor_hint(&flat[index + 1]));
    }
    Ok(())
}

fn print_quiz_question(quiz: &QuizSession) {
    let item = quiz.current_item();
    println!();
    println!(
        "Question {}/{}: {}",
        quiz.current_index() + 1,
        quiz.total_questions(),
        item.question().question()
    );
    for (i, option) in item.options().iter().enumerate() {
        let mark = if quiz.selected().contains(option) { "x" } else { " " };
        println!("  [{mark}] {}) {option}", i + 1);
    }
    println!("({})", kind_hint(item.question().kind()));
}

async fn run_quiz(
    services: &AppServices,
    selector: &TopicArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let (flat, index) = resolve_topic(services, selector)?;
    let topic = &flat[index];

    let Some(doc) = services.content().load_quiz(topic).await else {
        println!("No quiz published for {}.", topic.topic_title());
        return Ok(());
    };
    let Some(mut quiz) = QuizSession::build(doc) else {
        println!("No quiz published for {}.", topic.topic_title());
        return Ok(());
    };

    services.progress().set_last_visited(topic.key().clone());
    println!("{}: {} question(s)", quiz.title(), quiz.total_questions());
    let mut lines = input_lines();

    loop {
        print_quiz_question(&quiz);

        let answered_correctly = loop {
            prompt("choice (number, s = submit): ")?;
            let Some(line) = lines.next_line().await? else {
                println!("Quiz abandoned.");
                return Ok(());
            };
            let input = line.trim();

            if input.eq_ignore_ascii_case("s") {
                match quiz.submit() {
                    Ok(correct) => break correct,
                    Err(e) => println!("{e}"),
                }
                continue;
            }
            match input.parse::<usize>() {
                Ok(n) if n >= 1 && n <= quiz.current_item().options().len() => {
                    let option = quiz.current_item().options()[n - 1].clone();
                    quiz.select_option(&option);
                    println!("selected: {}", format_selection(quiz.selected()));
                }
                _ => println!("enter an option number or s to submit"),
            }
        };

        let item = quiz.current_item();
        if answered_correctly {
            println!("Correct.");
        } else {
            println!(
                "Incorrect. Correct answer(s): {}",
                item.question().correct_answers().join(", ")
            );
        }
        if !item.question().explanation().is_empty() {
            println!("{}", item.question().explanation());
        }

        match quiz.advance()? {
            QuizStep::Next => {}
            QuizStep::Finished(outcome) => {
                println!();
                println!(
                    "Quiz finished: {}% ({}/{})",
                    outcome.score_percent(),
                    outcome.correct(),
                    outcome.total()
                );
                if services.streaks().record_activity() {
                    println!("Streak: {} day(s).", services.streaks().current_streak());
                }
                return Ok(());
            }
        }
    }
}

fn print_exam_question(session: &ExamSession) {
    let question = session.current_question();
    let selected = session.selected_answers(question.id());
    let flag = if session.is_flagged(question.id()) { " [flagged]" } else { "" };

    println!();
    println!(
        "Question {}/{} ({} / {}){flag}",
        session.current_index() + 1,
        session.total_questions(),
        question.category_title(),
        question.topic_title()
    );
    println!("{}", question.question().question());
    for (i, option) in question.question().options().iter().enumerate() {
        let mark = if selected.contains(option) { "x" } else { " " };
        println!("  [{mark}] {}) {option}", i + 1);
    }
    println!(
        "({}; {}/{} answered, {} flagged, {} left)",
        kind_hint(question.question().kind()),
        session.answered_count(),
        session.total_questions(),
        session.flagged_count(),
        format_duration(session.remaining_secs())
    );
}

enum Pending {
    SubmitConfirm,
    QuitConfirm,
}

enum ExamCommand {
    Stay,
    Redraw,
    Abandon,
    Finished(ExamResult),
}

fn exam_input(
    session: &mut ExamSession,
    input: &str,
    pending: &mut Option<Pending>,
) -> Result<ExamCommand, ExamError> {
    if let Some(active) = pending.take() {
        if input.eq_ignore_ascii_case("y") {
            return Ok(match active {
                Pending::SubmitConfirm => ExamCommand::Finished(session.submit(Utc::now())?),
                Pending::QuitConfirm => ExamCommand::Abandon,
            });
        }
        return Ok(ExamCommand::Redraw);
    }

    if let Ok(n) = input.parse::<usize>() {
        let options = session.current_question().question().options();
        if n == 0 || n > options.len() {
            println!("pick a number between 1 and {}", options.len());
            return Ok(ExamCommand::Stay);
        }
        let option = options[n - 1].clone();
        session.record_answer(&option);
        return Ok(ExamCommand::Redraw);
    }

    if let Some(raw) = input.strip_prefix("g ") {
        if let Ok(n) = raw.trim().parse::<usize>() {
            if n >= 1 && session.goto(n - 1).is_ok() {
                return Ok(ExamCommand::Redraw);
            }
            println!("no question {n}");
        } else {
            println!("usage: g <question number>");
        }
        return Ok(ExamCommand::Stay);
    }

    match input {
        "n" => {
            session.next();
            Ok(ExamCommand::Redraw)
        }
        "p" => {
            session.prev();
            Ok(ExamCommand::Redraw)
        }
        "f" => {
            let flagged = session.toggle_flag();
            println!("{}", if flagged { "flagged for review" } else { "flag removed" });
            Ok(ExamCommand::Stay)
        }
        "r" => Ok(ExamCommand::Redraw),
        "s" => {
            let summary = session.submit_summary();
            if summary.unanswered > 0 || summary.flagged > 0 {
                println!(
                    "{} unanswered, {} flagged. submit anyway? (y/n)",
                    summary.unanswered, summary.flagged
                );
                *pending = Some(Pending::SubmitConfirm);
                return Ok(ExamCommand::Stay);
            }
            Ok(ExamCommand::Finished(session.submit(Utc::now())?))
        }
        "q" => {
            println!("abandon the exam without a result? (y/n)");
            *pending = Some(Pending::QuitConfirm);
            Ok(ExamCommand::Stay)
        }
        "" => Ok(ExamCommand::Stay),
        _ => {
            println!("commands: option number, n, p, g <i>, f, r, s, q");
            Ok(ExamCommand::Stay)
        }
    }
}

async fn drive_exam(
    session: &mut ExamSession,
) -> Result<Option<ExamResult>, Box<dyn std::error::Error>> {
    let mut lines = input_lines();
    // First tick one second in, not immediately.
    let mut ticker = interval_at(
        Instant::now() + Duration::from_secs(1),
        Duration::from_secs(1),
    );
    let mut pending = None;

    println!("commands: option number toggles, n next, p prev, g <i> jump, f flag, r redraw, s submit, q quit");
    print_exam_question(session);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                if let Some(result) = session.tick(Utc::now()) {
                    println!();
                    println!("Time is up.");
                    return Ok(Some(result));
                }
                if matches!(session.remaining_secs(), 60 | 10) {
                    println!("{} seconds remaining", session.remaining_secs());
                }
            }
            line = lines.next_line() => {
                let Some(line) = line? else {
                    return Ok(None);
                };
                match exam_input(session, line.trim(), &mut pending)? {
                    ExamCommand::Stay => {}
                    ExamCommand::Redraw => print_exam_question(session),
                    ExamCommand::Abandon => return Ok(None),
                    ExamCommand::Finished(result) => return Ok(Some(result)),
                }
            }
        }
    }
}

fn report_result(result: &ExamResult) {
    let verdict = if result.score() >= PASS_SCORE { "PASS" } else { "FAIL" };
    println!(
        "Result: {}% ({}/{} correct) in {}  {verdict}",
        result.score(),
        result.correct_answers(),
        result.total_questions(),
        format_duration(result.time_used())
    );
}

async fn run_exam(
    services: &AppServices,
    args: &ExamArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let certification = services.catalog().certification(&args.certification)?;
    let categories = match &args.categories {
        Some(ids) => ids.clone(),
        None => certification
            .categories()
            .iter()
            .map(|category| category.id().to_owned())
            .collect(),
    };
    let config = ExamConfig::new(
        args.questions.unwrap_or(DEFAULT_QUESTION_COUNT),
        args.time.unwrap_or(DEFAULT_TIME_LIMIT_MIN),
        categories,
    )?;

    println!("Assembling exam for {}...", certification.title());
    let mut session = services
        .assembler()
        .assemble(certification, &config, |progress| {
            println!(
                "  scanned {}/{} topics, {} question(s) found",
                progress.topics_scanned, progress.topics_total, progress.questions_found
            );
        })
        .await?;

    println!();
    println!(
        "{} question(s), {} minute(s). Answers are scored on submit.",
        session.total_questions(),
        config.time_limit_min()
    );

    match drive_exam(&mut session).await? {
        Some(result) => {
            println!();
            report_result(&result);
            services.exam_history().record(result);
            if services.streaks().record_activity() {
                println!("Streak: {} day(s).", services.streaks().current_streak());
            }
        }
        None => println!("Exam abandoned; nothing recorded."),
    }
    Ok(())
}

fn run_history(
    services: &AppServices,
    certification: Option<&str>,
) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(id) = certification {
        services.catalog().certification(id)?;
    }

    let history = services.exam_history();
    let results = match certification {
        Some(id) => history.for_certification(id),
        None => history.all(),
    };
    if results.is_empty() {
        println!("No exams recorded.");
        return Ok(());
    }

    println!(
        "{} exam(s), average {:.0}%, best {}%",
        results.len(),
        history.average_score(certification),
        history.best_score(certification)
    );
    for result in &results {
        println!("  {}", format_result(result));
    }
    Ok(())
}

fn run_freeze(services: &AppServices) {
    let streaks = services.streaks();
    if streaks.use_freeze() {
        println!(
            "Streak freeze armed for this week ({} used so far).",
            streaks.freezes_used()
        );
    } else {
        println!("The freeze for this week is already in place.");
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv: Vec<String> = std::env::args().skip(1).collect();

    // Default behavior: the overview when no subcommand is provided.
    let cmd = match argv.first().map(String::as_str) {
        None => Command::Overview,
        Some("--help" | "-h") => {
            print_usage();
            return Ok(());
        }
        Some(first) if first.starts_with("--") => Command::Overview,
        Some(first) => Command::from_arg(first).ok_or_else(|| {
            eprintln!("unknown subcommand: {first}");
            print_usage();
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "unknown subcommand")
        })?,
    };

    if argv.first().is_some_and(|first| !first.starts_with("--")) {
        argv.remove(0);
    }

    let mut iter = argv.into_iter();
    match cmd {
        Command::Overview => {
            let common = parse_overview(&mut iter).map_err(report_args_error)?;
            let services = build_services(&common)?;
            run_overview(&services);
            Ok(())
        }
        Command::Read => {
            let args = parse_read(&mut iter).map_err(report_args_error)?;
            let services = build_services(&args.common)?;
            run_read(&services, &args).await
        }
        Command::Quiz => {
            let (common, selector) = parse_quiz(&mut iter).map_err(report_args_error)?;
            let services = build_services(&common)?;
            run_quiz(&services, &selector).await
        }
        Command::Exam => {
            let args = parse_exam(&mut iter).map_err(report_args_error)?;
            let services = build_services(&args.common)?;
            run_exam(&services, &args).await
        }
        Command::History => {
            let (common, certification) = parse_history(&mut iter).map_err(report_args_error)?;
            let services = build_services(&common)?;
            run_history(&services, certification.as_deref())
        }
        Command::Freeze => {
            let common = parse_freeze(&mut iter).map_err(report_args_error)?;
            let services = build_services(&common)?;
            run_freeze(&services);
            Ok(())
        }
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
