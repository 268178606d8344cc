//! Built-in exercise catalogs inserted by the seed endpoints.

use chrono::{DateTime, Utc};

use crate::models::{ArticulationExercise, ReceptiveExercise, ReceptiveOption};

/// Value of `mode` on every receptive document.
pub const RECEPTIVE_MODE: &str = "receptive";

const RECEPTIVE_LEVEL_COLOR: &str = "#3b82f6";

/// Display label for an articulation sound id.
pub fn sound_name(sound_id: &str) -> Option<&'static str> {
    match sound_id {
        "s" => Some("S Sound"),
        "r" => Some("R Sound"),
        "l" => Some("L Sound"),
        "k" => Some("K Sound"),
        "th" => Some("TH Sound"),
        _ => None,
    }
}

/// Articulation level number to level name.
pub fn articulation_level_name(level: i32) -> Option<&'static str> {
    match level {
        1 => Some("Sound"),
        2 => Some("Syllable"),
        3 => Some("Word"),
        4 => Some("Phrase"),
        5 => Some("Sentence"),
        _ => None,
    }
}

/// Receptive level number to level name.
pub fn receptive_level_name(level: i32) -> Option<&'static str> {
    match level {
        1 => Some("Vocabulary"),
        2 => Some("Directions"),
        3 => Some("Comprehension"),
        _ => None,
    }
}

// (exercise_id, sound_id, level, target, order)
const ARTICULATION_SEED: &[(&str, &str, i32, &str, i32)] = &[
    ("s-sound-1", "s", 1, "ssssss", 1),
    ("s-sound-2", "s", 1, "s-s-s-s", 2),
    ("s-syllable-1", "s", 2, "sa", 1),
    ("s-syllable-2", "s", 2, "so", 2),
    ("s-syllable-3", "s", 2, "su", 3),
    ("s-word-1", "s", 3, "sun", 1),
    ("s-word-2", "s", 3, "see", 2),
    ("s-word-3", "s", 3, "sit", 3),
    ("s-phrase-1", "s", 4, "see the sun", 1),
    ("s-phrase-2", "s", 4, "sit down please", 2),
    ("s-sentence-1", "s", 5, "The sun is shining.", 1),
    ("s-sentence-2", "s", 5, "I can see seven stars.", 2),
    ("r-sound-1", "r", 1, "rrrrrr", 1),
    ("r-word-1", "r", 3, "red", 1),
    ("r-word-2", "r", 3, "run", 2),
    ("l-sound-1", "l", 1, "llllll", 1),
    ("l-word-1", "l", 3, "look", 1),
    ("l-word-2", "l", 3, "like", 2),
    ("k-sound-1", "k", 1, "k-k-k-k", 1),
    ("k-word-1", "k", 3, "cat", 1),
    ("k-word-2", "k", 3, "come", 2),
    ("th-sound-1", "th", 1, "th-th-th", 1),
    ("th-word-1", "th", 3, "think", 1),
    ("th-word-2", "th", 3, "thank", 2),
];

/// The default articulation catalog, every entry active and stamped with `now`.
pub fn articulation_catalog(now: DateTime<Utc>) -> Vec<ArticulationExercise> {
    ARTICULATION_SEED
        .iter()
        .map(|&(exercise_id, sound_id, level, target, order)| ArticulationExercise {
            exercise_id: exercise_id.to_string(),
            sound_id: sound_id.to_string(),
            sound_name: sound_name(sound_id).unwrap_or_default().to_string(),
            level,
            level_name: articulation_level_name(level).unwrap_or_default().to_string(),
            target: target.to_string(),
            order,
            is_active: true,
            created_at: now,
            updated_at: now,
        })
        .collect()
}

struct ReceptiveSeed {
    exercise_id: &'static str,
    level: i32,
    exercise_type: &'static str,
    instruction: &'static str,
    target: &'static str,
    // (text, image)
    options: [(&'static str, &'static str); 4],
    // 0-based index into `options`.
    correct: usize,
    order: i32,
}

const RECEPTIVE_SEED: &[ReceptiveSeed] = &[
    ReceptiveSeed {
        exercise_id: "vocab-1",
        level: 1,
        exercise_type: "vocabulary",
        instruction: "Which picture shows an apple?",
        target: "apple",
        options: [("Apple", "🍎"), ("Ball", "⚽"), ("Car", "🚗"), ("House", "🏠")],
        correct: 0,
        order: 1,
    },
    ReceptiveSeed {
        exercise_id: "vocab-2",
        level: 1,
        exercise_type: "vocabulary",
        instruction: "Find the picture of a dog",
        target: "dog",
        options: [("Cat", "🐱"), ("Dog", "🐕"), ("Bird", "🐦"), ("Fish", "🐠")],
        correct: 1,
        order: 2,
    },
    ReceptiveSeed {
        exercise_id: "vocab-3",
        level: 1,
        exercise_type: "vocabulary",
        instruction: "Which one is a book?",
        target: "book",
        options: [("Phone", "📱"), ("Book", "📚"), ("Pen", "✏️"), ("Cup", "☕")],
        correct: 1,
        order: 3,
    },
    ReceptiveSeed {
        exercise_id: "dir-1",
        level: 2,
        exercise_type: "directions",
        instruction: "Point to the picture that shows: Turn right",
        target: "turn right",
        options: [("Turn Left", "⬅️"), ("Turn Right", "➡️"), ("Go Up", "⬆️"), ("Go Down", "⬇️")],
        correct: 1,
        order: 1,
    },
    ReceptiveSeed {
        exercise_id: "dir-2",
        level: 2,
        exercise_type: "directions",
        instruction: "Which picture shows: Put the cup on the table",
        target: "put cup on table",
        options: [
            ("Cup on table", "☕📋"),
            ("Cup in hand", "☕✋"),
            ("Empty table", "📋"),
            ("Cup on floor", "☕⬇️"),
        ],
        correct: 0,
        order: 2,
    },
    ReceptiveSeed {
        exercise_id: "dir-3",
        level: 2,
        exercise_type: "directions",
        instruction: "Find: Open the door",
        target: "open door",
        options: [("Closed door", "🚪"), ("Open door", "🚪➡️"), ("Window", "🪟"), ("Lock", "🔒")],
        correct: 1,
        order: 3,
    },
    ReceptiveSeed {
        exercise_id: "comp-1",
        level: 3,
        exercise_type: "comprehension",
        instruction: "The cat is sleeping. Where is the cat?",
        target: "cat sleeping",
        options: [("Running", "🐱💨"), ("Eating", "🐱🍽️"), ("Sleeping", "🐱💤"), ("Playing", "🐱⚽")],
        correct: 2,
        order: 1,
    },
    ReceptiveSeed {
        exercise_id: "comp-2",
        level: 3,
        exercise_type: "comprehension",
        instruction: "The boy is playing with a ball. What is the boy doing?",
        target: "boy playing ball",
        options: [
            ("Reading", "👦📚"),
            ("Playing ball", "👦⚽"),
            ("Sleeping", "👦💤"),
            ("Eating", "👦🍽️"),
        ],
        correct: 1,
        order: 2,
    },
];

/// The default receptive catalog, every entry active and stamped with `now`.
pub fn receptive_catalog(now: DateTime<Utc>) -> Vec<ReceptiveExercise> {
    RECEPTIVE_SEED
        .iter()
        .map(|seed| ReceptiveExercise {
            mode: RECEPTIVE_MODE.to_string(),
            level: seed.level,
            level_name: receptive_level_name(seed.level).unwrap_or_default().to_string(),
            level_color: RECEPTIVE_LEVEL_COLOR.to_string(),
            exercise_id: seed.exercise_id.to_string(),
            exercise_type: seed.exercise_type.to_string(),
            instruction: seed.instruction.to_string(),
            target: Some(seed.target.to_string()),
            options: seed
                .options
                .iter()
                .enumerate()
                .map(|(i, (text, image))| ReceptiveOption {
                    id: i as i32 + 1,
                    text: text.to_string(),
                    image: image.to_string(),
                    correct: i == seed.correct,
                })
                .collect(),
            order: seed.order,
            is_active: true,
            created_at: now,
            updated_at: now,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    #[test]
    fn articulation_catalog_covers_every_sound() {
        let catalog = articulation_catalog(Utc::now());
        assert_eq!(catalog.len(), 24);

        let sounds: BTreeSet<&str> = catalog.iter().map(|e| e.sound_id.as_str()).collect();
        assert_eq!(sounds, BTreeSet::from(["k", "l", "r", "s", "th"]));

        // The S sound is the only one authored across all five levels.
        let s_levels: BTreeSet<i32> = catalog
            .iter()
            .filter(|e| e.sound_id == "s")
            .map(|e| e.level)
            .collect();
        assert_eq!(s_levels, BTreeSet::from([1, 2, 3, 4, 5]));
    }

    #[test]
    fn articulation_names_follow_the_fixed_mapping() {
        for exercise in articulation_catalog(Utc::now()) {
            assert_eq!(Some(exercise.sound_name.as_str()), sound_name(&exercise.sound_id));
            assert_eq!(
                Some(exercise.level_name.as_str()),
                articulation_level_name(exercise.level)
            );
        }
    }

    #[test]
    fn receptive_catalog_has_one_correct_option_per_item() {
        let catalog = receptive_catalog(Utc::now());
        assert_eq!(catalog.len(), 8);

        for exercise in &catalog {
            assert_eq!(exercise.mode, RECEPTIVE_MODE);
            assert_eq!(exercise.options.len(), 4);
            assert_eq!(exercise.options.iter().filter(|o| o.correct).count(), 1);
            let ids: Vec<i32> = exercise.options.iter().map(|o| o.id).collect();
            assert_eq!(ids, vec![1, 2, 3, 4]);
        }

        let levels: BTreeSet<&str> = catalog.iter().map(|e| e.level_name.as_str()).collect();
        assert_eq!(levels, BTreeSet::from(["Comprehension", "Directions", "Vocabulary"]));
    }
}
