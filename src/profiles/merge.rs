// Running-average merge of a new sample into an author's aggregate.
//
// The aggregate already stands for `prior_samples` samples, so it carries
// weight n and the new sample carries weight 1:
//
//   merged = (aggregate * n + sample) / (n + 1)
//
// Signal vectors of different lengths are zero-padded to the longer one and
// punctuation classes are unioned, with a missing class counting as 0.

use std::collections::BTreeSet;

use crate::features::fingerprint::{Fingerprint, PunctuationClass};

/// Fold `sample` into `aggregate`, which summarizes `prior_samples` samples.
///
/// `min_words` is the short-sample threshold used to recompute
/// `low_confidence` from the combined word count.
pub fn merge_fingerprints(
    aggregate: &Fingerprint,
    prior_samples: u32,
    sample: &Fingerprint,
    min_words: u32,
) -> Fingerprint {
    let n = f64::from(prior_samples.max(1));
    let total = n + 1.0;
    let avg = |old: f64, new: f64| (old * n + new) / total;

    let len = aggregate.signal_vector.len().max(sample.signal_vector.len());
    let signal_vector = (0..len)
        .map(|i| {
            let old = aggregate.signal_vector.get(i).copied().unwrap_or(0.0);
            let new = sample.signal_vector.get(i).copied().unwrap_or(0.0);
            avg(old, new)
        })
        .collect();

    let classes: BTreeSet<PunctuationClass> = aggregate
        .punctuation_histogram
        .keys()
        .chain(sample.punctuation_histogram.keys())
        .copied()
        .collect();
    let punctuation_histogram = classes
        .into_iter()
        .map(|class| {
            (
                class,
                avg(aggregate.punctuation(class), sample.punctuation(class)),
            )
        })
        .collect();

    let sample_word_count = aggregate
        .sample_word_count
        .saturating_add(sample.sample_word_count);

    Fingerprint {
        subject_id: aggregate.subject_id.clone(),
        avg_sentence_length: avg(aggregate.avg_sentence_length, sample.avg_sentence_length),
        lexical_diversity: avg(aggregate.lexical_diversity, sample.lexical_diversity),
        passive_voice_ratio: avg(aggregate.passive_voice_ratio, sample.passive_voice_ratio),
        hapax_ratio: avg(aggregate.hapax_ratio, sample.hapax_ratio),
        function_word_ratio: avg(aggregate.function_word_ratio, sample.function_word_ratio),
        punctuation_histogram,
        signal_vector,
        dictionary_version: sample.dictionary_version.clone(),
        sample_word_count,
        sentence_count: aggregate.sentence_count.saturating_add(sample.sentence_count),
        low_confidence: sample_word_count < min_words,
        created_at: aggregate.created_at,
    }
}
