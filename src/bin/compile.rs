use std::path::PathBuf;
use std::process;

use clap::Parser;

use lmgec::analyze::Tagger;
use lmgec::correct::{Corrector, DefaultCorrector};
use lmgec::inflect::Inflections;
use lmgec::lm::ArpaModel;
use lmgec::spell::Spell;
use lmgec::{Component, Error};

/// Compiles the raw text resources into one binary corrector file which
/// the `lmgec` binary can load with `--corrector` instead of re-parsing
/// the resources on every run.
#[derive(Parser)]
#[command(version, about)]
struct Opts {
    /// The path to an ARPA language model file.
    #[arg(short, long)]
    model: PathBuf,
    /// A wordlist with one `word` or `word<TAB>frequency` entry per line.
    #[arg(short, long)]
    wordlist: PathBuf,
    /// An inflection database with `lemma tag: form ...` entries.
    #[arg(short, long)]
    inflections: PathBuf,
    /// An optional `form<TAB>lemma<TAB>tag` lexicon for lemmatization.
    /// Derived by inverting the inflection database if absent.
    #[arg(long)]
    lexicon: Option<PathBuf>,
    /// Where to write the compiled corrector.
    #[arg(short, long)]
    out: PathBuf,
}

fn run(opts: Opts) -> Result<(), Error> {
    let lm = ArpaModel::from_path(&opts.model).map_err(|err| err.in_resource("language model"))?;
    let spell = Spell::from_path(&opts.wordlist).map_err(|err| err.in_resource("wordlist"))?;
    let inflections = Inflections::from_path(&opts.inflections)
        .map_err(|err| err.in_resource("inflection database"))?;
    let tagger = match opts.lexicon.as_ref() {
        Some(path) => Tagger::from_path(path).map_err(|err| err.in_resource("lexicon"))?,
        None => Tagger::from_inflections(&inflections),
    };

    let corrector: DefaultCorrector = Corrector::new(lm, tagger, spell, inflections);
    corrector.store(&opts.out)?;

    log::info!("wrote compiled {} to {}", DefaultCorrector::name(), opts.out.display());
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
