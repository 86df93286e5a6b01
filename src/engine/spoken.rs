//! Numbers as a speech recognizer hands them over: either plain digits
//! ("41.85") or words ("forty one point eight five").

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SpokenNumberError {
    #[error("no number was given")]
    Empty,

    #[error("unrecognized word in number: {0}")]
    UnknownWord(String),

    #[error("misplaced word in number: {0}")]
    Misplaced(String),
}

pub fn parse_spoken_number(input: &str) -> Result<f64, SpokenNumberError> {
    let compact: String = input.split_whitespace().collect();

    if compact.is_empty() {
        return Err(SpokenNumberError::Empty);
    }
    if let Ok(value) = compact.parse::<f64>() {
        return Ok(value);
    }

    let normalized = input.to_lowercase().replace('-', " ");

    let mut words: Vec<&str> = normalized
        .split_whitespace()
        .filter(|word| *word != "and")
        .collect();

    let mut sign = 1.0;
    if matches!(words.first(), Some(&("minus" | "negative"))) {
        sign = -1.0;
        words.remove(0);
    }
    if let Ok(value) = words.concat().parse::<f64>() {
        return Ok(sign * value);
    }

    let mut current: u64 = 0;
    let mut seen_whole = false;
    let mut fraction = String::new();
    let mut in_fraction = false;
    let mut pending_tens: Option<u64> = None;

    for word in words {
        if word == "point" || word == "dot" {
            if in_fraction {
                return Err(SpokenNumberError::Misplaced(word.to_string()));
            }
            in_fraction = true;
            continue;
        }

        if in_fraction {
            // after the point every word is read as digits: "eighty five" is "85"
            let value = small_number(word)
                .ok_or_else(|| SpokenNumberError::UnknownWord(word.to_string()))?;
            match (pending_tens.take(), value) {
                (Some(tens), unit @ 1..=9) => fraction.push_str(&(tens + unit).to_string()),
                (Some(tens), other) => {
                    fraction.push_str(&tens.to_string());
                    pending_tens = push_fraction_word(&mut fraction, other);
                }
                (None, other) => pending_tens = push_fraction_word(&mut fraction, other),
            }
            continue;
        }

        if word == "hundred" {
            if current >= 100 {
                return Err(SpokenNumberError::Misplaced(word.to_string()));
            }
            current = current.max(1).saturating_mul(100);
            seen_whole = true;
            continue;
        }

        let value = small_number(word)
            .ok_or_else(|| SpokenNumberError::UnknownWord(word.to_string()))?;
        if !fits_after(current, value, seen_whole) {
            return Err(SpokenNumberError::Misplaced(word.to_string()));
        }
        current = current.saturating_add(value);
        seen_whole = true;
    }

    if let Some(tens) = pending_tens {
        fraction.push_str(&tens.to_string());
    }

    let whole = current;
    if !seen_whole && fraction.is_empty() {
        return Err(SpokenNumberError::Empty);
    }

    let text = if fraction.is_empty() {
        whole.to_string()
    } else {
        format!("{whole}.{fraction}")
    };

    text.parse::<f64>()
        .map(|value| sign * value)
        .map_err(|_| SpokenNumberError::Misplaced(input.to_string()))
}

/// Tens after the point wait for a following unit ("eighty five" -> "85");
/// everything else is appended as-is.
fn push_fraction_word(fraction: &mut String, value: u64) -> Option<u64> {
    if value >= 20 && value % 10 == 0 {
        Some(value)
    } else {
        fraction.push_str(&value.to_string());
        None
    }
}

/// Whether `value` can follow the whole part read so far. Tens and teens
/// only start a group ("one hundred twenty"), units only finish a round ten
/// ("forty one"), and zero stands alone.
fn fits_after(current: u64, value: u64, seen_whole: bool) -> bool {
    let group = current % 100;
    match value {
        0 => !seen_whole,
        1..=9 => group % 10 == 0 && !(10..20).contains(&group),
        _ => group == 0,
    }
}

fn digit_token(word: &str) -> Option<u64> {
    if word.chars().all(|c| c.is_ascii_digit()) {
        word.parse().ok()
    } else {
        None
    }
}

fn small_number(word: &str) -> Option<u64> {
    let value = match word {
        "zero" | "oh" => 0,
        "one" => 1,
        "two" => 2,
        "three" => 3,
        "four" => 4,
        "five" => 5,
        "six" => 6,
        "seven" => 7,
        "eight" => 8,
        "nine" => 9,
        "ten" => 10,
        "eleven" => 11,
        "twelve" => 12,
        "thirteen" => 13,
        "fourteen" => 14,
        "fifteen" => 15,
        "sixteen" => 16,
        "seventeen" => 17,
        "eighteen" => 18,
        "nineteen" => 19,
        "twenty" => 20,
        "thirty" => 30,
        "forty" => 40,
        "fifty" => 50,
        "sixty" => 60,
        "seventy" => 70,
        "eighty" => 80,
        "ninety" => 90,
        other => return digit_token(other),
    };
    Some(value)
}
