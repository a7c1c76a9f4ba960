use std::io::{self, Read};
use std::path::PathBuf;

use anyhow::{anyhow, Context};
use gumdrop::Options;
use language_tags::LanguageTag;
use serde::Serialize;

use morphspell::paths;
use morphspell::speller::suggestion::Suggestion;
use morphspell::speller::SpellerConfig;
use morphspell::tokenizer::Tokenize;
use morphspell::Session;

trait OutputWriter {
    fn write_correction(&mut self, word: &str, is_correct: bool);
    fn write_suggestions(&mut self, word: &str, suggestions: &[Suggestion]);
    fn write_results(&mut self, word: &str, results: &[String]);
    fn finish(&mut self) -> anyhow::Result<()>;
}

struct StdoutWriter;

impl OutputWriter for StdoutWriter {
    fn write_correction(&mut self, word: &str, is_correct: bool) {
        println!(
            "Input: {}\t\t[{}]",
            &word,
            if is_correct { "CORRECT" } else { "INCORRECT" }
        );
    }

    fn write_suggestions(&mut self, _word: &str, suggestions: &[Suggestion]) {
        for sugg in suggestions {
            println!("{}\t\t{}", sugg.value(), sugg.weight());
        }
        println!();
    }

    fn write_results(&mut self, word: &str, results: &[String]) {
        println!("Input: {}", word);
        for result in results {
            println!("{}", result);
        }
        println!();
    }

    fn finish(&mut self) -> anyhow::Result<()> {
        Ok(())
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct WordResult {
    word: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    is_correct: Option<bool>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    suggestions: Vec<Suggestion>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    results: Vec<String>,
}

impl WordResult {
    fn new(word: &str) -> WordResult {
        WordResult {
            word: word.to_owned(),
            is_correct: None,
            suggestions: vec![],
            results: vec![],
        }
    }
}

#[derive(Serialize)]
struct JsonWriter {
    results: Vec<WordResult>,
}

impl JsonWriter {
    pub fn new() -> JsonWriter {
        JsonWriter { results: vec![] }
    }

    fn current(&mut self, word: &str) -> &mut WordResult {
        if self.results.last().map(|r| r.word != word).unwrap_or(true) {
            self.results.push(WordResult::new(word));
        }
        let i = self.results.len() - 1;
        &mut self.results[i]
    }
}

impl OutputWriter for JsonWriter {
    fn write_correction(&mut self, word: &str, is_correct: bool) {
        self.results.push(WordResult {
            is_correct: Some(is_correct),
            ..WordResult::new(word)
        });
    }

    fn write_suggestions(&mut self, word: &str, suggestions: &[Suggestion]) {
        self.current(word).suggestions = suggestions.to_vec();
    }

    fn write_results(&mut self, word: &str, results: &[String]) {
        self.current(word).results = results.to_vec();
    }

    fn finish(&mut self) -> anyhow::Result<()> {
        println!("{}", serde_json::to_string_pretty(self)?);
        Ok(())
    }
}

#[derive(Debug, Options)]
struct Args {
    #[options(help = "print help message")]
    help: bool,

    #[options(help = "dictionary (.dic) file to be used")]
    dic: Option<PathBuf>,

    #[options(help = "affix (.aff) file to be used")]
    aff: Option<PathBuf>,

    #[options(help = "language tag used to find a dictionary in DICPATH and system directories")]
    lang: Option<String>,

    #[options(help = "key for encrypted .hz sources")]
    key: Option<String>,

    #[options(help = "extra word list added to the runtime dictionary (repeatable)")]
    user_dic: Vec<PathBuf>,

    #[options(command)]
    command: Option<Command>,
}

#[derive(Debug, Options)]
enum Command {
    #[options(help = "get suggestions for provided input")]
    Suggest(SuggestArgs),

    #[options(help = "print morphological analyses of provided input")]
    Analyze(WordArgs),

    #[options(help = "print stems of provided input")]
    Stem(WordArgs),

    #[options(help = "inflect provided input like an exemplar word")]
    Generate(GenerateArgs),

    #[options(help = "print input in word-separated tokenized form")]
    Tokenize(TokenizeArgs),
}

#[derive(Debug, Options)]
struct SuggestArgs {
    #[options(help = "print help message")]
    help: bool,

    #[options(short = "S", help = "always show suggestions even if word is correct")]
    always_suggest: bool,

    #[options(help = "maximum weight limit for suggestions")]
    weight: Option<f32>,

    #[options(help = "maximum number of results")]
    nbest: Option<usize>,

    #[options(
        no_short,
        long = "no-case-handling",
        help = "disables case-handling algorithm"
    )]
    disable_case_handling: bool,

    #[options(no_short, long = "json", help = "output in JSON format")]
    use_json: bool,

    #[options(free, help = "words to be processed")]
    inputs: Vec<String>,
}

#[derive(Debug, Options)]
struct WordArgs {
    #[options(help = "print help message")]
    help: bool,

    #[options(no_short, long = "json", help = "output in JSON format")]
    use_json: bool,

    #[options(free, help = "words to be processed")]
    inputs: Vec<String>,
}

#[derive(Debug, Options)]
struct GenerateArgs {
    #[options(help = "print help message")]
    help: bool,

    #[options(help = "word whose inflection is copied", required)]
    exemplar: String,

    #[options(no_short, long = "json", help = "output in JSON format")]
    use_json: bool,

    #[options(free, help = "words to be processed")]
    inputs: Vec<String>,
}

#[derive(Debug, Options)]
struct TokenizeArgs {
    #[options(help = "print help message")]
    help: bool,

    #[options(short = "w", long = "words", help = "show words only")]
    is_words_only: bool,

    #[options(free, help = "text to be tokenized")]
    inputs: Vec<String>,
}

fn read_stdin() -> anyhow::Result<String> {
    eprintln!("Reading from stdin...");
    let mut buffer = String::new();
    io::stdin()
        .read_to_string(&mut buffer)
        .context("reading stdin")?;
    Ok(buffer)
}

fn read_words(inputs: Vec<String>) -> anyhow::Result<Vec<String>> {
    if !inputs.is_empty() {
        return Ok(inputs);
    }

    Ok(read_stdin()?
        .lines()
        .map(|x| x.trim().to_string())
        .filter(|x| !x.is_empty())
        .collect())
}

fn writer(use_json: bool) -> Box<dyn OutputWriter> {
    if use_json {
        Box::new(JsonWriter::new())
    } else {
        Box::new(StdoutWriter)
    }
}

fn open_session(args: &Args, config: SpellerConfig) -> anyhow::Result<Session> {
    let (dic, aff) = match (&args.dic, &args.aff, &args.lang) {
        (Some(dic), Some(aff), _) => (dic.clone(), aff.clone()),
        (Some(dic), None, _) => (dic.clone(), dic.with_extension("aff")),
        (None, _, Some(lang)) => {
            let tag: LanguageTag = lang
                .parse()
                .map_err(|e| anyhow!("invalid language tag {}: {:?}", lang, e))?;
            paths::find_dictionary(&tag)
                .ok_or_else(|| anyhow!("no dictionary found for {}", lang))?
        }
        _ => return Err(anyhow!("either --dic or --lang is required")),
    };

    let session = Session::open_with_config(&dic, &aff, args.key.as_deref(), config)
        .with_context(|| format!("opening {}", dic.display()))?;

    for path in &args.user_dic {
        let count = session
            .add_dic(path)
            .with_context(|| format!("loading {}", path.display()))?;
        log::info!("added {} words from {}", count, path.display());
    }

    Ok(session)
}

fn suggest(args: &Args, cmd: SuggestArgs) -> anyhow::Result<()> {
    let mut suggest_cfg = SpellerConfig::default();

    if cmd.disable_case_handling {
        suggest_cfg.case_handling = None;
    }

    if let Some(v) = cmd.nbest {
        if v == 0 {
            suggest_cfg.n_best = None;
        } else {
            suggest_cfg.n_best = Some(v);
        }
    }

    if let Some(v) = cmd.weight.filter(|x| x >= &0.0) {
        if v == 0.0 {
            suggest_cfg.max_weight = None;
        } else {
            suggest_cfg.max_weight = Some(v);
        }
    }

    let mut writer = writer(cmd.use_json);
    let session = open_session(args, suggest_cfg.clone())?;

    for word in read_words(cmd.inputs)? {
        let is_correct = session.is_correct(&word)?;
        writer.write_correction(&word, is_correct);

        if cmd.always_suggest || !is_correct {
            let suggestions = session.suggest_with_config(&word, &suggest_cfg)?;
            writer.write_suggestions(&word, &suggestions);
        }
    }

    session.close();
    writer.finish()
}

fn analyze(args: &Args, cmd: WordArgs, stem: bool) -> anyhow::Result<()> {
    let mut writer = writer(cmd.use_json);
    let session = open_session(args, SpellerConfig::default())?;

    for word in read_words(cmd.inputs)? {
        let results = if stem {
            session.stem(&word)?
        } else {
            session.analyze(&word)?
        };
        writer.write_results(&word, &results);
    }

    session.close();
    writer.finish()
}

fn generate(args: &Args, cmd: GenerateArgs) -> anyhow::Result<()> {
    let mut writer = writer(cmd.use_json);
    let session = open_session(args, SpellerConfig::default())?;

    for word in read_words(cmd.inputs)? {
        let results = session.generate(&word, &cmd.exemplar)?;
        writer.write_results(&word, &results);
    }

    session.close();
    writer.finish()
}

fn tokenize(cmd: TokenizeArgs) -> anyhow::Result<()> {
    let inputs: String = if cmd.inputs.is_empty() {
        read_stdin()?
    } else {
        cmd.inputs.join(" ")
    };

    if cmd.is_words_only {
        for (index, token) in inputs.word_indices() {
            println!("{:>4}: \"{}\"", index, token);
        }
    } else {
        for (index, token) in inputs.word_bound_indices() {
            println!("{:>4}: \"{}\"", index, token);
        }
    }

    Ok(())
}

fn main() -> anyhow::Result<()> {
    pretty_env_logger::init();

    let mut args = Args::parse_args_default_or_exit();

    match args.command.take() {
        None => Ok(()),
        Some(Command::Suggest(cmd)) => suggest(&args, cmd),
        Some(Command::Analyze(cmd)) => analyze(&args, cmd, false),
        Some(Command::Stem(cmd)) => analyze(&args, cmd, true),
        Some(Command::Generate(cmd)) => generate(&args, cmd),
        Some(Command::Tokenize(cmd)) => tokenize(cmd),
    }
}
