use chrono::prelude::*;
use std::error::Error;
use std::{
    io::Write,
    time::{Duration, Instant, SystemTime},
};

use distance::damerau_levenshtein;
use indicatif::{ParallelProgressIterator, ProgressBar, ProgressStyle};
use morphspell::constants::DEFAULT_MAX_CANDIDATES;
use morphspell::speller::suggestion::Suggestion;
use morphspell::speller::{CaseHandlingConfig, SpellerConfig};
use morphspell::Session;
use rayon::iter::{IntoParallelRefIterator, ParallelIterator};
use serde::Serialize;
use structopt::clap::{App, AppSettings, Arg};

static CFG: SpellerConfig = SpellerConfig {
    n_best: Some(10),
    max_weight: Some(10000.0),
    case_handling: Some(CaseHandlingConfig::default()),
    max_candidates: DEFAULT_MAX_CANDIDATES,
    max_overlay_words: None,
};

fn load_words(
    path: &str,
    max_words: Option<usize>,
) -> Result<Vec<(String, String)>, Box<dyn Error>> {
    let mut rdr = csv::ReaderBuilder::new()
        .comment(Some(b'#'))
        .delimiter(b'\t')
        .has_headers(false)
        .flexible(true)
        .from_path(path)?;

    Ok(rdr
        .records()
        .filter_map(Result::ok)
        .filter_map(|r| {
            r.get(0)
                .and_then(|x| r.get(1).map(|y| (x.to_string(), y.to_string())))
        })
        .take(max_words.unwrap_or(std::usize::MAX))
        .collect())
}

#[derive(Debug, Default, Serialize, PartialOrd, Ord, PartialEq, Eq, Clone, Copy)]
struct Time {
    secs: u64,
    subsec_nanos: u32,
}

impl From<Duration> for Time {
    fn from(d: Duration) -> Time {
        Time {
            secs: d.as_secs(),
            subsec_nanos: d.subsec_nanos(),
        }
    }
}

impl Time {
    fn as_duration(self) -> Duration {
        Duration::new(self.secs, self.subsec_nanos)
    }
}

impl std::fmt::Display for Time {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> Result<(), std::fmt::Error> {
        let ms = self.secs * 1000 + (self.subsec_nanos as u64 / 1_000_000);
        write!(f, "{}ms", ms)
    }
}

#[derive(Debug, Serialize)]
struct AccuracyResult<'a> {
    input: &'a str,
    expected: &'a str,
    distance: usize,
    suggestions: Vec<Suggestion>,
    position: Option<usize>,
    time: Time,
}

#[derive(Debug, Serialize)]
struct DictionaryInfo {
    dic: String,
    aff: String,
    encoding: &'static str,
}

#[derive(Debug, Serialize)]
struct Report<'a> {
    dictionary: DictionaryInfo,
    config: &'a SpellerConfig,
    summary: Summary,
    results: Vec<AccuracyResult<'a>>,
    start_timestamp: Time,
    total_time: Time,
}

#[derive(Serialize, Default, Debug, Clone)]
struct Summary {
    total_words: u32,
    first_position: u32,
    top_five: u32,
    any_position: u32,
    no_suggestions: u32,
    only_wrong: u32,
    slowest_lookup: Time,
    fastest_lookup: Time,
    average_time: Time,
    average_time_95pc: Time,
}

impl std::fmt::Display for Summary {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> Result<(), std::fmt::Error> {
        let percent =
            |v: u32| -> String { format!("{:.2}%", v as f32 / self.total_words as f32 * 100f32) };

        write!(
            f,
            "[#1] {} [^5] {} [any] {} [none] {} [wrong] {} [fast] {} [slow] {} [avg] {} [avg95] {}",
            percent(self.first_position),
            percent(self.top_five),
            percent(self.any_position),
            percent(self.no_suggestions),
            percent(self.only_wrong),
            self.fastest_lookup,
            self.slowest_lookup,
            self.average_time,
            self.average_time_95pc
        )
    }
}

fn average(times: &[Time]) -> Time {
    if times.is_empty() {
        return Time::default();
    }
    let total: Duration = times.iter().map(|t| t.as_duration()).sum();
    Time::from(total / times.len() as u32)
}

impl Summary {
    fn new<'a>(results: &[AccuracyResult<'a>]) -> Summary {
        let mut summary = Summary::default();

        results.iter().for_each(|result| {
            summary.total_words += 1;

            if let Some(position) = result.position {
                summary.any_position += 1;

                if position == 0 {
                    summary.first_position += 1;
                }

                if position < 5 {
                    summary.top_five += 1;
                }
            } else if result.suggestions.is_empty() {
                summary.no_suggestions += 1;
            } else {
                summary.only_wrong += 1;
            }
        });

        let mut times: Vec<Time> = results.iter().map(|r| r.time).collect();
        times.sort();

        summary.fastest_lookup = times.first().copied().unwrap_or_default();
        summary.slowest_lookup = times.last().copied().unwrap_or_default();
        summary.average_time = average(&times);

        let fastest_95pc = (times.len() as f64 * 0.95).ceil() as usize;
        summary.average_time_95pc = average(&times[..fastest_95pc.min(times.len())]);

        summary
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    pretty_env_logger::init();

    let matches = App::new("morphspell-accuracy")
        .setting(AppSettings::ArgRequiredElseHelp)
        .version(env!("CARGO_PKG_VERSION"))
        .about("Accuracy testing for morphspell.")
        .arg(
            Arg::with_name("config")
                .short("c")
                .takes_value(true)
                .help("Provide JSON config file to override test defaults"),
        )
        .arg(
            Arg::with_name("words")
                .value_name("WORDS")
                .help("The 'input -> expected' list in tab-delimited value file (TSV)"),
        )
        .arg(
            Arg::with_name("dic")
                .value_name("DIC")
                .help("Use the given dictionary (.dic) file"),
        )
        .arg(
            Arg::with_name("aff")
                .long("aff")
                .takes_value(true)
                .help("Use the given affix file instead of the one next to the dictionary"),
        )
        .arg(
            Arg::with_name("key")
                .short("k")
                .takes_value(true)
                .help("Key for encrypted .hz sources"),
        )
        .arg(
            Arg::with_name("json-output")
                .short("o")
                .takes_value(true)
                .value_name("JSON-OUTPUT")
                .help("The file path for the JSON report output"),
        )
        .arg(
            Arg::with_name("tsv-output")
                .short("t")
                .takes_value(true)
                .value_name("TSV-OUTPUT")
                .help("The file path for the TSV line append"),
        )
        .arg(
            Arg::with_name("max-words")
                .short("w")
                .takes_value(true)
                .help("Truncate typos list to max number of words specified"),
        )
        .get_matches();

    let cfg: SpellerConfig = match matches.value_of("config") {
        Some(path) => {
            let file = std::fs::File::open(path)?;
            serde_json::from_reader(file)?
        }
        None => CFG.clone(),
    };

    let dic = match matches.value_of("dic") {
        Some(path) => std::path::PathBuf::from(path),
        None => {
            eprintln!("No dictionary found for given path; aborting.");
            std::process::exit(1);
        }
    };
    let aff = matches
        .value_of("aff")
        .map(std::path::PathBuf::from)
        .unwrap_or_else(|| dic.with_extension("aff"));

    let session = Session::open_with_config(&dic, &aff, matches.value_of("key"), cfg.clone())?;

    let words = match matches.value_of("words") {
        Some(path) => load_words(
            path,
            matches
                .value_of("max-words")
                .and_then(|x| x.parse::<usize>().ok()),
        )?,
        None => {
            eprintln!("No word list for given path; aborting.");
            std::process::exit(1);
        }
    };

    if words.is_empty() {
        eprintln!("Word list is empty; aborting.");
        std::process::exit(1);
    }

    let pb = ProgressBar::new(words.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{pos}/{len} [{percent}%] {wide_bar} {elapsed_precise}"),
    );

    let start_time = Instant::now();
    let results = words
        .par_iter()
        .progress_with(pb)
        .map(|(input, expected)| {
            let now = Instant::now();
            let suggestions = session.suggest(input).unwrap_or_else(|e| {
                log::warn!("{}: {}", input, e);
                vec![]
            });
            let time = Time::from(now.elapsed());

            let position = suggestions.iter().position(|x| x.value() == expected.as_str());

            let distance = damerau_levenshtein(input, expected);
            AccuracyResult {
                input,
                expected,
                distance,
                time,
                suggestions,
                position,
            }
        })
        .collect::<Vec<_>>();

    let total_time = Time::from(start_time.elapsed());
    let start_timestamp = Time::from(
        SystemTime::now()
            .duration_since(SystemTime::UNIX_EPOCH)
            .unwrap_or_default(),
    );

    let summary = Summary::new(&results);
    println!("{}", summary);

    if let Some(path) = matches.value_of("json-output") {
        let output = std::fs::File::create(path)?;
        let report = Report {
            dictionary: DictionaryInfo {
                dic: dic.display().to_string(),
                aff: aff.display().to_string(),
                encoding: session.dictionary_encoding()?.name(),
            },
            config: &cfg,
            summary,
            results,
            start_timestamp,
            total_time,
        };
        println!("Writing JSON report…");
        serde_json::to_writer_pretty(output, &report)?;
    } else if let Some(path) = matches.value_of("tsv-output") {
        let mut output = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)?;
        let md = output.metadata()?;
        if md.len() == 0 {
            // new file, write headers:
            output
                .write_all(b"id\tdate\ttag/branch\ttop1\ttop5\tworse\tno suggs\twrong suggs\n")?;
        }
        let git_id = std::process::Command::new("git")
            .arg("rev-parse")
            .arg("--short")
            .arg("HEAD")
            .output()?;
        let git_descr = std::process::Command::new("git").arg("describe").output()?;

        let row = [
            String::from_utf8_lossy(&git_id.stdout).trim().to_string(),
            Local::now().to_rfc3339(),
            String::from_utf8_lossy(&git_descr.stdout).trim().to_string(),
            summary.first_position.to_string(),
            summary.top_five.to_string(),
            summary.any_position.to_string(),
            summary.no_suggestions.to_string(),
            summary.only_wrong.to_string(),
        ];
        output.write_all(row.join("\t").as_bytes())?;
        output.write_all(b"\n")?;
    };

    session.close();
    println!("Done!");
    Ok(())
}
