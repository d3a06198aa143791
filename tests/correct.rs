use lazy_static::lazy_static;
use quickcheck_macros::quickcheck;

use lmgec::analyze::{Analyze, Tagger};
use lmgec::correct::{Corrector, CorrectorOptions, DefaultCorrector};
use lmgec::inflect::Inflections;
use lmgec::lm::ArpaModel;
use lmgec::spell::{Spell, Spellcheck};
use lmgec::types::{EditWeights, Outcome, Sweep, TokenData};
use lmgec::{Component, Error};

// A small bigram model; probabilities are chosen so that "an apple",
// "the message" and "the mat" are preferred in context while every
// out-of-vocabulary word falls back to the <unk> entry. The "<s> the"
// bigram keeps sentence-initial "the" cheap enough that neither it nor a
// nearby preposition is worth deleting from an already correct sentence.
const MODEL: &str = "\
\\data\\
ngram 1=31
ngram 2=4

\\1-grams:
-0.1 </s>
-5.0 <unk>
-1.0 she
-1.0 bought
-1.5 a
-1.2 the
-1.3 an
-1.8 apple
-2.2 apples
-1.0 i
-1.1 received
-2.0 receive
-2.0 receives
-2.0 receiving
-1.4 message
-1.0 cat
-1.0 sat
-1.0 on
-1.5 mat
-2.0 buy
-2.0 buys
-2.0 buying
-2.0 in
-2.0 of
-2.0 to
-2.0 at
-2.0 by
-2.0 for
-2.0 from
-2.0 with
-2.0 about

\\2-grams:
-0.5 <s> the
-0.2 an apple
-0.2 the message
-0.4 the mat

\\end\\
";

const WORDLIST: &str = "\
she
bought
a
an
the
apple
apples
i
received
receive
receives
receiving
message
cat
sat
on
mat
buy
buys
buying
in
of
to
at
by
for
from
with
about
";

const INFLECTIONS: &str = "\
buy V: bought buys buying
apple N: apples
receive V: received receiving receives
";

fn fixture() -> DefaultCorrector {
    let lm = ArpaModel::from_arpa(MODEL.as_bytes()).unwrap();
    let spell = Spell::from_wordlist(WORDLIST.as_bytes()).unwrap();
    let inflections = Inflections::from_dump(INFLECTIONS.as_bytes()).unwrap();
    let tagger = Tagger::from_inflections(&inflections);

    Corrector::new(lm, tagger, spell, inflections)
}

lazy_static! {
    static ref CORRECTOR: DefaultCorrector = fixture();
}

fn tokens(text: &str) -> Vec<String> {
    text.split_whitespace().map(|x| x.to_owned()).collect()
}

#[test]
fn corrects_a_determiner() {
    assert_eq!(
        CORRECTOR.correct_line("she bought a apple"),
        "She bought an apple"
    );
}

#[test]
fn corrects_spelling_errors_one_sweep_at_a_time() {
    let sent = tokens("i recieved the mesage");

    // exactly one edit per sweep
    match CORRECTOR.sweep(&sent).unwrap() {
        Sweep::Accepted(new_sent) => {
            let changed = new_sent.iter().filter(|x| !sent.contains(*x)).count();
            assert_eq!(changed, 1);
        }
        Sweep::Converged => panic!("expected an accepted edit"),
    }

    // full convergence fixes both words
    assert_eq!(
        CORRECTOR.correct_line("i recieved the mesage"),
        "I received the message"
    );
}

#[test]
fn converged_sentences_are_fixed_points() {
    let (corrected, outcome) = CORRECTOR
        .correct_tokens(tokens("she bought a apple"))
        .unwrap();
    assert!(matches!(outcome, Outcome::Converged { .. }));

    // re-running the search on the converged sentence changes nothing
    assert_eq!(CORRECTOR.sweep(&corrected).unwrap(), Sweep::Converged);
    let (again, outcome) = CORRECTOR.correct_tokens(corrected.clone()).unwrap();
    assert_eq!(again, corrected);
    assert_eq!(outcome, Outcome::Converged { sweeps: 0 });
}

#[test]
fn correct_sentences_are_left_alone() {
    // the determiner and preposition providers both offer deletions here;
    // none of them may clear the threshold
    let (corrected, outcome) = CORRECTOR
        .correct_tokens(tokens("the cat sat on the mat"))
        .unwrap();
    assert_eq!(corrected, tokens("the cat sat on the mat"));
    assert_eq!(outcome, Outcome::Converged { sweeps: 0 });

    assert_eq!(
        CORRECTOR.correct_line("the cat sat on the mat"),
        "The cat sat on the mat"
    );
    assert_eq!(
        CORRECTOR.correct_line("The cat sat on the mat"),
        "The cat sat on the mat"
    );
}

#[test]
fn blank_lines_pass_through() {
    assert_eq!(CORRECTOR.correct_line(""), "");
    assert_eq!(CORRECTOR.correct_line("   \t "), "");
}

#[test]
fn batches_stay_aligned() {
    let lines = vec![
        "she bought a apple".to_owned(),
        String::new(),
        "the cat sat on the mat".to_owned(),
    ];

    let corrected = CORRECTOR.correct_batch(&lines);
    assert_eq!(corrected.len(), lines.len());
    assert_eq!(corrected[0], "She bought an apple");
    assert_eq!(corrected[1], "");
    assert_eq!(corrected[2], "The cat sat on the mat");
}

#[test]
fn uppercase_lines_are_restored() {
    assert_eq!(
        CORRECTOR.correct_line("SHE BOUGHT A APPLE"),
        "SHE BOUGHT AN APPLE"
    );
}

#[test]
fn runs_are_deterministic() {
    let lines: Vec<String> = vec![
        "she bought a apple".into(),
        "i recieved the mesage".into(),
        "the cat sat on the mat".into(),
    ];

    assert_eq!(CORRECTOR.correct_batch(&lines), CORRECTOR.correct_batch(&lines));
}

#[test]
fn stricter_thresholds_block_edits() {
    // with negative log-probability scores, lowering the multiplier demands
    // a larger improvement margin; at 0.5 no hypothesis qualifies
    let mut strict = fixture();
    strict.set_options(CorrectorOptions {
        weights: EditWeights::uniform(0.5),
        ..CorrectorOptions::default()
    });

    assert_eq!(strict.correct_line("she bought a apple"), "She bought a apple");
}

#[test]
fn the_sweep_ceiling_is_enforced() {
    let mut limited = fixture();
    limited.set_options(CorrectorOptions {
        max_sweeps: 1,
        ..CorrectorOptions::default()
    });

    let (corrected, outcome) = limited
        .correct_tokens(tokens("i recieved the mesage"))
        .unwrap();
    assert_eq!(outcome, Outcome::IterationLimitReached);
    // the single permitted sweep still applied its one edit
    assert_ne!(corrected, tokens("i recieved the mesage"));
}

struct BrokenAnalyzer;

impl Analyze for BrokenAnalyzer {
    fn analyze(&self, _tokens: &[String]) -> Vec<TokenData> {
        Vec::new()
    }
}

#[test]
fn misaligned_analyses_degrade_to_passthrough() {
    let lm = ArpaModel::from_arpa(MODEL.as_bytes()).unwrap();
    let spell = Spell::from_wordlist(WORDLIST.as_bytes()).unwrap();
    let inflections = Inflections::from_dump(INFLECTIONS.as_bytes()).unwrap();
    let corrector = Corrector::new(lm, BrokenAnalyzer, spell, inflections);

    let err = corrector
        .correct_tokens(tokens("she bought a apple"))
        .unwrap_err();
    assert!(matches!(err, Error::MisalignedAnalysis { tokens: 4, annotations: 0 }));

    // the line is surfaced unchanged (apart from capitalization) and the
    // batch keeps running
    assert_eq!(corrector.correct_line("she bought a apple"), "She bought a apple");
}

#[test]
fn compiled_correctors_behave_like_fresh_ones() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("corrector.bin");

    fixture().store(&path).unwrap();
    let restored = DefaultCorrector::restore(&path).unwrap();

    assert_eq!(
        restored.correct_line("she bought a apple"),
        CORRECTOR.correct_line("she bought a apple")
    );
}

#[test]
fn resources_load_from_paths() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("wordlist.txt");
    std::fs::write(&path, WORDLIST).unwrap();

    let spell = Spell::from_path(&path).unwrap();
    let missing = Spell::from_path(dir.path().join("nope.txt"));

    assert!(spell.is_known("apple"));
    assert!(missing.is_err());
}

#[quickcheck]
fn output_is_blank_iff_input_is_blank(line: String) -> bool {
    let out = CORRECTOR.correct_line(&line);
    out.is_empty() == line.split_whitespace().next().is_none()
}

#[quickcheck]
fn batches_never_lose_lines(lines: Vec<String>) -> bool {
    CORRECTOR.correct_batch(&lines).len() == lines.len()
}
