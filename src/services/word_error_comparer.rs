//! 转写比较服务 - 业务能力层
//!
//! 按单词计算编辑距离，输出 WER 及替换/删除/插入数量

use crate::capabilities::Comparer;
use serde_json::{json, Value as JsonValue};

/// 单词级编辑距离比较器
#[derive(Debug, Default)]
pub struct WordErrorComparer;

/// 编辑操作计数
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct EditCounts {
    pub substitutions: usize,
    pub deletions: usize,
    pub insertions: usize,
}

impl EditCounts {
    pub fn total(&self) -> usize {
        self.substitutions + self.deletions + self.insertions
    }
}

impl WordErrorComparer {
    pub fn new() -> Self {
        Self
    }
}

impl Comparer for WordErrorComparer {
    fn compare(&self, model_transcript: &str, target_transcript: &str) -> JsonValue {
        let hypothesis: Vec<&str> = model_transcript.split_whitespace().collect();
        let reference: Vec<&str> = target_transcript.split_whitespace().collect();
        let counts = edit_counts(&reference, &hypothesis);

        let wer = if reference.is_empty() {
            if hypothesis.is_empty() {
                0.0
            } else {
                1.0
            }
        } else {
            counts.total() as f64 / reference.len() as f64
        };

        json!({
            "wer": wer,
            "substitutions": counts.substitutions,
            "deletions": counts.deletions,
            "insertions": counts.insertions,
            "referenceWords": reference.len(),
            "hypothesisWords": hypothesis.len(),
        })
    }
}

/// Levenshtein 对齐，`reference` → `hypothesis`
pub fn edit_counts(reference: &[&str], hypothesis: &[&str]) -> EditCounts {
    let cols = hypothesis.len() + 1;
    let mut prev: Vec<(usize, EditCounts)> = (0..cols)
        .map(|j| {
            (
                j,
                EditCounts {
                    insertions: j,
                    ..EditCounts::default()
                },
            )
        })
        .collect();

    for (i, ref_word) in reference.iter().enumerate() {
        let mut row = Vec::with_capacity(cols);
        row.push((
            i + 1,
            EditCounts {
                deletions: i + 1,
                ..EditCounts::default()
            },
        ));

        for (j, hyp_word) in hypothesis.iter().enumerate() {
            let (diag_cost, diag) = prev[j];
            let (up_cost, up) = prev[j + 1];
            let (left_cost, left) = row[j];

            let candidate = if ref_word == hyp_word {
                (diag_cost, diag)
            } else {
                (
                    diag_cost + 1,
                    EditCounts {
                        substitutions: diag.substitutions + 1,
                        ..diag
                    },
                )
            };
            let deletion = (
                up_cost + 1,
                EditCounts {
                    deletions: up.deletions + 1,
                    ..up
                },
            );
            let insertion = (
                left_cost + 1,
                EditCounts {
                    insertions: left.insertions + 1,
                    ..left
                },
            );

            let best = [candidate, deletion, insertion]
                .into_iter()
                .min_by_key(|(cost, _)| *cost)
                .unwrap_or(candidate);
            row.push(best);
        }
        prev = row;
    }

    prev[cols - 1].1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical_transcripts() {
        let result = WordErrorComparer::new().compare("the quick fox", "the quick fox");
        assert_eq!(result["wer"], json!(0.0));
        assert_eq!(result["referenceWords"], json!(3));
    }

    #[test]
    fn test_counts_each_edit_kind() {
        // reference: a b c d, hypothesis: a x c d e → 1 substitution, 1 insertion
        let counts = edit_counts(&["a", "b", "c", "d"], &["a", "x", "c", "d", "e"]);
        assert_eq!(counts.substitutions, 1);
        assert_eq!(counts.insertions, 1);
        assert_eq!(counts.deletions, 0);

        let counts = edit_counts(&["a", "b", "c"], &["a", "c"]);
        assert_eq!(counts.deletions, 1);
        assert_eq!(counts.total(), 1);
    }

    #[test]
    fn test_wer_value() {
        let result = WordErrorComparer::new().compare("one two", "one two three four");
        assert_eq!(result["deletions"], json!(2));
        assert_eq!(result["wer"], json!(0.5));
    }

    #[test]
    fn test_empty_reference() {
        let comparer = WordErrorComparer::new();
        assert_eq!(comparer.compare("", "")["wer"], json!(0.0));
        assert_eq!(comparer.compare("hello", "")["wer"], json!(1.0));
    }
}
