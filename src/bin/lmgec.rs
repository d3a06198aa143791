use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::PathBuf;
use std::process;

use clap::Parser;

use lmgec::analyze::Tagger;
use lmgec::correct::{Corrector, CorrectorOptions, DefaultCorrector};
use lmgec::inflect::Inflections;
use lmgec::lm::ArpaModel;
use lmgec::spell::Spell;
use lmgec::types::{EditWeights, DEFAULT_THRESHOLD};
use lmgec::{Component, Error};

/// Corrects spelling, morphology and determiner / preposition errors in
/// pre-tokenized sentences, one sentence per line, using a language model
/// to decide which corrections are improvements.
#[derive(Parser)]
#[command(version, about)]
struct Opts {
    /// A text file containing one tokenized sentence per line.
    input: PathBuf,
    /// The path to an ARPA language model file.
    #[arg(short, long, required_unless_present = "corrector")]
    model: Option<PathBuf>,
    /// A wordlist with one `word` or `word<TAB>frequency` entry per line.
    #[arg(short, long, required_unless_present = "corrector")]
    wordlist: Option<PathBuf>,
    /// An inflection database with `lemma tag: form ...` entries.
    #[arg(short, long, required_unless_present = "corrector")]
    inflections: Option<PathBuf>,
    /// An optional `form<TAB>lemma<TAB>tag` lexicon for lemmatization.
    /// Derived by inverting the inflection database if absent.
    #[arg(long)]
    lexicon: Option<PathBuf>,
    /// A compiled corrector produced by `compile`, replacing the raw
    /// resource options.
    #[arg(long, conflicts_with_all = ["model", "wordlist", "inflections", "lexicon"])]
    corrector: Option<PathBuf>,
    /// The output text file, one corrected sentence per line.
    #[arg(short, long)]
    out: PathBuf,
    /// LM percent improvement threshold. The default of 0.96 requires
    /// scores to be at least 4% higher than the original.
    #[arg(short, long, default_value_t = DEFAULT_THRESHOLD)]
    threshold: f64,
    /// Overrides the threshold for spelling edits.
    #[arg(long)]
    spelling_weight: Option<f64>,
    /// Overrides the threshold for morphology edits.
    #[arg(long)]
    morph_weight: Option<f64>,
    /// Overrides the threshold for determiner edits.
    #[arg(long)]
    det_weight: Option<f64>,
    /// Overrides the threshold for preposition edits.
    #[arg(long)]
    prep_weight: Option<f64>,
    /// Upper bound on accepted edits per sentence.
    #[arg(long, default_value_t = 50)]
    max_sweeps: usize,
}

fn load(opts: &Opts) -> Result<DefaultCorrector, Error> {
    if let Some(path) = opts.corrector.as_ref() {
        return DefaultCorrector::restore(path)
            .map_err(|err| err.in_resource("compiled corrector"));
    }

    // clap enforces that the raw resource paths are present when no
    // compiled corrector is given
    let model = opts.model.as_ref().expect("required unless --corrector");
    let wordlist = opts.wordlist.as_ref().expect("required unless --corrector");
    let inflections = opts
        .inflections
        .as_ref()
        .expect("required unless --corrector");

    let lm = ArpaModel::from_path(model).map_err(|err| err.in_resource("language model"))?;
    let spell = Spell::from_path(wordlist).map_err(|err| err.in_resource("wordlist"))?;
    let inflections =
        Inflections::from_path(inflections).map_err(|err| err.in_resource("inflection database"))?;
    let tagger = match opts.lexicon.as_ref() {
        Some(path) => Tagger::from_path(path).map_err(|err| err.in_resource("lexicon"))?,
        None => Tagger::from_inflections(&inflections),
    };

    Ok(Corrector::new(lm, tagger, spell, inflections))
}

fn run(opts: Opts) -> Result<(), Error> {
    let mut corrector = load(&opts)?;
    corrector.set_options(CorrectorOptions {
        weights: EditWeights {
            spelling: opts.spelling_weight.unwrap_or(opts.threshold),
            morphology: opts.morph_weight.unwrap_or(opts.threshold),
            determiner: opts.det_weight.unwrap_or(opts.threshold),
            preposition: opts.prep_weight.unwrap_or(opts.threshold),
        },
        max_sweeps: opts.max_sweeps,
    });

    let lines: Vec<String> = BufReader::new(File::open(&opts.input)?)
        .lines()
        .collect::<Result<_, _>>()?;
    let corrected = corrector.correct_batch(&lines);

    let mut out = BufWriter::new(File::create(&opts.out)?);
    for line in corrected {
        writeln!(out, "{}", line)?;
    }

    Ok(())
}

fn main() {
    env_logger::init();
    let opts = Opts::parse();

    if let Err(err) = run(opts) {
        log::error!("{}", err);
        process::exit(1);
    }
}
