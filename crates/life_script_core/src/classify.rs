//! crates/life_script_core/src/classify.rs
//!
//! The deterministic three-axis classification computed from quiz answers.
//! No I/O and no hidden state: the same answers always yield the same labels.

use crate::domain::{Answers, Choice, Classification, LifeType, MoneyType, PersonalityType};
use std::ops::RangeInclusive;

/// Questions 1-8 probe attitudes to money.
pub const MONEY_QUESTIONS: RangeInclusive<u32> = 1..=8;
/// Questions 9-17 probe lifestyle.
pub const LIFE_QUESTIONS: RangeInclusive<u32> = 9..=17;
/// Questions 18-25 probe personality.
pub const PERSONALITY_QUESTIONS: RangeInclusive<u32> = 18..=25;

/// Number of questions in the survey.
pub const QUESTION_COUNT: u32 = 25;

/// Per-letter tallies within one question range.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChoiceCounts {
    pub a: u32,
    pub b: u32,
    pub c: u32,
    pub d: u32,
}

impl ChoiceCounts {
    /// Tallies the answers whose question number falls in `range`.
    pub fn tally(answers: &Answers, range: RangeInclusive<u32>) -> Self {
        answers
            .range(range)
            .fold(Self::default(), |mut counts, (_, choice)| {
                match choice {
                    Choice::A => counts.a += 1,
                    Choice::B => counts.b += 1,
                    Choice::C => counts.c += 1,
                    Choice::D => counts.d += 1,
                }
                counts
            })
    }
}

pub fn money_type(counts: ChoiceCounts) -> MoneyType {
    let ambition = counts.a + counts.d;
    if ambition > counts.b && ambition > counts.c {
        MoneyType::Growth
    } else if counts.b > counts.c {
        MoneyType::Enjoyment
    } else {
        MoneyType::Stable
    }
}

pub fn life_type(counts: ChoiceCounts) -> LifeType {
    if counts.a > counts.b && counts.a > counts.c {
        LifeType::Relaxed
    } else if counts.b > counts.c {
        LifeType::Balanced
    } else {
        LifeType::Social
    }
}

pub fn personality_type(counts: ChoiceCounts) -> PersonalityType {
    if counts.a > counts.b {
        PersonalityType::Decisive
    } else if counts.b > counts.c {
        PersonalityType::Cautious
    } else {
        PersonalityType::Hesitant
    }
}

/// Classifies a full or partial answer set. Ties always fall through to the
/// next branch, so the result is stable for any input.
pub fn classify(answers: &Answers) -> Classification {
    Classification {
        money: money_type(ChoiceCounts::tally(answers, MONEY_QUESTIONS)),
        life: life_type(ChoiceCounts::tally(answers, LIFE_QUESTIONS)),
        personality: personality_type(ChoiceCounts::tally(answers, PERSONALITY_QUESTIONS)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn answers_from(letters: &str) -> Answers {
        letters
            .chars()
            .enumerate()
            .filter_map(|(i, c)| {
                let choice = match c {
                    'A' => Choice::A,
                    'B' => Choice::B,
                    'C' => Choice::C,
                    'D' => Choice::D,
                    _ => return None,
                };
                Some((i as u32 + 1, choice))
            })
            .collect()
    }

    fn counts(a: u32, b: u32, c: u32, d: u32) -> ChoiceCounts {
        ChoiceCounts { a, b, c, d }
    }

    #[test]
    fn tally_only_counts_the_requested_range() {
        let answers = answers_from("AAAABBCC");
        assert_eq!(ChoiceCounts::tally(&answers, MONEY_QUESTIONS), counts(4, 2, 2, 0));
        assert_eq!(ChoiceCounts::tally(&answers, LIFE_QUESTIONS), ChoiceCounts::default());
    }

    #[test]
    fn money_growth_when_a_plus_d_dominates() {
        assert_eq!(money_type(counts(4, 2, 2, 0)), MoneyType::Growth);
        assert_eq!(money_type(counts(1, 2, 2, 3)), MoneyType::Growth);
    }

    #[test]
    fn money_ties_fall_through() {
        // A+D == B, so not growth; B > C gives enjoyment.
        assert_eq!(money_type(counts(2, 3, 1, 1)), MoneyType::Enjoyment);
        // B == C falls to stable.
        assert_eq!(money_type(counts(1, 3, 3, 1)), MoneyType::Stable);
        assert_eq!(money_type(ChoiceCounts::default()), MoneyType::Stable);
    }

    #[test]
    fn life_branches() {
        assert_eq!(life_type(counts(4, 3, 2, 0)), LifeType::Relaxed);
        assert_eq!(life_type(counts(3, 3, 2, 1)), LifeType::Balanced);
        assert_eq!(life_type(counts(3, 3, 3, 0)), LifeType::Social);
    }

    #[test]
    fn personality_branches() {
        assert_eq!(personality_type(counts(3, 2, 2, 1)), PersonalityType::Decisive);
        assert_eq!(personality_type(counts(2, 2, 1, 3)), PersonalityType::Cautious);
        assert_eq!(personality_type(counts(2, 2, 2, 2)), PersonalityType::Hesitant);
    }

    #[test]
    fn full_answer_set_classifies_each_dimension() {
        let mut full = answers_from("AAAADBCC");
        full.extend(answers_from(&format!("{}BBBBBCCCA", "X".repeat(8))));
        full.extend(answers_from(&format!("{}CCCCCCCC", "X".repeat(17))));
        assert_eq!(full.len(), QUESTION_COUNT as usize);

        let result = classify(&full);
        assert_eq!(result.money, MoneyType::Growth);
        assert_eq!(result.life, LifeType::Balanced);
        assert_eq!(result.personality, PersonalityType::Hesitant);
    }

    #[test]
    fn classification_is_pure() {
        let answers = answers_from("ABCDABCDABCDABCDABCDABCDA");
        assert_eq!(classify(&answers), classify(&answers));
        let basic = classify(&answers).basic_results();
        assert!(["growth", "enjoyment", "stable"].contains(&basic.money_type.as_str()));
        assert!(["relaxed", "balanced", "social"].contains(&basic.life_type.as_str()));
        assert!(["decisive", "cautious", "hesitant"].contains(&basic.personality_type.as_str()));
        assert!(basic.summary.contains(&basic.money_type));
    }
}
