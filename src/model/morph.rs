/// Structured morphology tags in the MorphGNT CCAT encoding.
///
/// A CCAT tag is a two-character part-of-speech code (`V-`, `RA`, …) plus an
/// eight-character parse code whose slots are, in order: person, tense, voice,
/// mood, case, number, gender, degree. `-` marks a slot that does not apply.
use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::error::{InvalidFilter, UnknownMorphCode};

// ── Part of speech ───────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PartOfSpeech {
    Adjective,
    Conjunction,
    Adverb,
    Interjection,
    Noun,
    Preposition,
    DefiniteArticle,
    DemonstrativePronoun,
    InterrogativeIndefinitePronoun,
    PersonalPronoun,
    RelativePronoun,
    Verb,
    Particle,
    /// A token whose source code was outside the known vocabulary.
    Unrecognized,
}

impl PartOfSpeech {
    pub const ALL: &'static [PartOfSpeech] = &[
        Self::Adjective,
        Self::Conjunction,
        Self::Adverb,
        Self::Interjection,
        Self::Noun,
        Self::Preposition,
        Self::DefiniteArticle,
        Self::DemonstrativePronoun,
        Self::InterrogativeIndefinitePronoun,
        Self::PersonalPronoun,
        Self::RelativePronoun,
        Self::Verb,
        Self::Particle,
        Self::Unrecognized,
    ];

    #[must_use]
    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|p| *p != Self::Unrecognized && p.code() == code)
    }

    #[must_use]
    pub fn code(self) -> &'static str {
        match self {
            Self::Adjective => "A-",
            Self::Conjunction => "C-",
            Self::Adverb => "D-",
            Self::Interjection => "I-",
            Self::Noun => "N-",
            Self::Preposition => "P-",
            Self::DefiniteArticle => "RA",
            Self::DemonstrativePronoun => "RD",
            Self::InterrogativeIndefinitePronoun => "RI",
            Self::PersonalPronoun => "RP",
            Self::RelativePronoun => "RR",
            Self::Verb => "V-",
            Self::Particle => "X-",
            Self::Unrecognized => "??",
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Adjective => "Adjective",
            Self::Conjunction => "Conjunction",
            Self::Adverb => "Adverb",
            Self::Interjection => "Interjection",
            Self::Noun => "Noun",
            Self::Preposition => "Preposition",
            Self::DefiniteArticle => "Definite Article",
            Self::DemonstrativePronoun => "Demonstrative Pronoun",
            Self::InterrogativeIndefinitePronoun => "Interrogative/Indefinite Pronoun",
            Self::PersonalPronoun => "Personal Pronoun",
            Self::RelativePronoun => "Relative Pronoun",
            Self::Verb => "Verb",
            Self::Particle => "Particle",
            Self::Unrecognized => "Unknown Part of Speech",
        }
    }
}

impl fmt::Display for PartOfSpeech {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for PartOfSpeech {
    type Err = String;

    /// Accepts the CCAT code (`V-`, `V`, `RA`), the label, or the variant
    /// name in any case (`verb`, `definite_article`, `Definite Article`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = squash(s);
        if key.is_empty() {
            return Err(format!("unknown part of speech '{s}'"));
        }
        Self::ALL
            .iter()
            .copied()
            .find(|p| {
                squash(p.code()) == key
                    || squash(p.label()) == key
                    || squash(&format!("{p:?}")) == key
            })
            .ok_or_else(|| format!("unknown part of speech '{s}'"))
    }
}

// ── Inflectional features ────────────────────────────────────────────

macro_rules! feature {
    ($(#[$meta:meta])* $name:ident { $($variant:ident = $letter:literal, $label:literal;)+ }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            #[must_use]
            pub fn from_letter(letter: char) -> Option<Self> {
                match letter {
                    $($letter => Some($name::$variant),)+
                    _ => None,
                }
            }

            #[must_use]
            pub fn letter(self) -> char {
                match self {
                    $($name::$variant => $letter),+
                }
            }

            #[must_use]
            pub fn label(self) -> &'static str {
                match self {
                    $($name::$variant => $label),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.label())
            }
        }

        impl FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let mut chars = s.trim().chars();
                if let (Some(c), None) = (chars.next(), chars.next()) {
                    if let Some(v) = c.to_uppercase().next().and_then(Self::from_letter) {
                        return Ok(v);
                    }
                }
                let key = squash(s);
                Self::ALL
                    .iter()
                    .copied()
                    .find(|v| squash(v.label()) == key || squash(&format!("{v:?}")) == key)
                    .ok_or_else(|| format!("unknown {} '{s}'", stringify!($name).to_lowercase()))
            }
        }
    };
}

feature!(Person {
    First = '1', "1st person";
    Second = '2', "2nd person";
    Third = '3', "3rd person";
});

feature!(Tense {
    Present = 'P', "present";
    Imperfect = 'I', "imperfect";
    Future = 'F', "future";
    Aorist = 'A', "aorist";
    Perfect = 'X', "perfect";
    Pluperfect = 'Y', "pluperfect";
});

feature!(Voice {
    Active = 'A', "active";
    Middle = 'M', "middle";
    Passive = 'P', "passive";
});

feature!(Mood {
    Indicative = 'I', "indicative";
    Imperative = 'D', "imperative";
    Subjunctive = 'S', "subjunctive";
    Optative = 'O', "optative";
    Infinitive = 'N', "infinitive";
    Participle = 'P', "participle";
});

feature!(Case {
    Nominative = 'N', "nominative";
    Genitive = 'G', "genitive";
    Dative = 'D', "dative";
    Accusative = 'A', "accusative";
    Vocative = 'V', "vocative";
});

feature!(Number {
    Singular = 'S', "singular";
    Plural = 'P', "plural";
});

feature!(Gender {
    Masculine = 'M', "masculine";
    Feminine = 'F', "feminine";
    Neuter = 'N', "neuter";
});

feature!(Degree {
    Comparative = 'C', "comparative";
    Superlative = 'S', "superlative";
});

// ── Tag ──────────────────────────────────────────────────────────────

/// A fully decoded morphology tag. `None` marks a feature that does not
/// apply to the word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct MorphTag {
    pub pos: PartOfSpeech,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub person: Option<Person>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tense: Option<Tense>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub voice: Option<Voice>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mood: Option<Mood>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub case: Option<Case>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub number: Option<Number>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<Gender>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub degree: Option<Degree>,
}

const PARSE_SLOTS: usize = 8;

impl MorphTag {
    /// Category for tokens whose source code could not be decoded.
    pub const UNRECOGNIZED: MorphTag = MorphTag::bare(PartOfSpeech::Unrecognized);

    #[must_use]
    pub const fn bare(pos: PartOfSpeech) -> Self {
        Self {
            pos,
            person: None,
            tense: None,
            voice: None,
            mood: None,
            case: None,
            number: None,
            gender: None,
            degree: None,
        }
    }

    /// Decode a CCAT part-of-speech code and parse code.
    pub fn from_ccat(pos: &str, parse: &str) -> Result<Self, UnknownMorphCode> {
        let unknown = |reason: String| UnknownMorphCode {
            code: format!("{pos} {parse}"),
            reason,
        };

        let part = PartOfSpeech::from_code(pos)
            .ok_or_else(|| unknown(format!("unknown part of speech '{pos}'")))?;

        let slots: Vec<char> = parse.chars().collect();
        if slots.len() != PARSE_SLOTS {
            return Err(unknown(format!(
                "parse code must have {PARSE_SLOTS} slots, found {}",
                slots.len()
            )));
        }

        Self::decode_slots(part, &slots).map_err(unknown)
    }

    fn decode_slots(pos: PartOfSpeech, slots: &[char]) -> Result<Self, String> {
        fn slot<T>(c: char, name: &str, decode: fn(char) -> Option<T>) -> Result<Option<T>, String> {
            if c == '-' {
                return Ok(None);
            }
            decode(c)
                .map(Some)
                .ok_or_else(|| format!("invalid {name} '{c}'"))
        }

        Ok(Self {
            pos,
            person: slot(slots[0], "person", Person::from_letter)?,
            tense: slot(slots[1], "tense", Tense::from_letter)?,
            voice: slot(slots[2], "voice", Voice::from_letter)?,
            mood: slot(slots[3], "mood", Mood::from_letter)?,
            case: slot(slots[4], "case", Case::from_letter)?,
            number: slot(slots[5], "number", Number::from_letter)?,
            gender: slot(slots[6], "gender", Gender::from_letter)?,
            degree: slot(slots[7], "degree", Degree::from_letter)?,
        })
    }

    #[must_use]
    pub fn is_recognized(&self) -> bool {
        self.pos != PartOfSpeech::Unrecognized
    }

    /// The CCAT parse code (eight slots) for this tag.
    #[must_use]
    pub fn parse_code(&self) -> String {
        fn letter<T: Copy>(v: Option<T>, f: fn(T) -> char) -> char {
            v.map_or('-', f)
        }
        [
            letter(self.person, Person::letter),
            letter(self.tense, Tense::letter),
            letter(self.voice, Voice::letter),
            letter(self.mood, Mood::letter),
            letter(self.case, Case::letter),
            letter(self.number, Number::letter),
            letter(self.gender, Gender::letter),
            letter(self.degree, Degree::letter),
        ]
        .iter()
        .collect()
    }

    /// Human-readable description, e.g.
    /// `Verb: 3rd person, aorist, active, indicative, singular`.
    #[must_use]
    pub fn describe(&self) -> String {
        let features: Vec<&str> = [
            self.person.map(Person::label),
            self.tense.map(Tense::label),
            self.voice.map(Voice::label),
            self.mood.map(Mood::label),
            self.case.map(Case::label),
            self.number.map(Number::label),
            self.gender.map(Gender::label),
            self.degree.map(Degree::label),
        ]
        .into_iter()
        .flatten()
        .collect();

        if features.is_empty() {
            self.pos.label().to_string()
        } else {
            format!("{}: {}", self.pos.label(), features.join(", "))
        }
    }
}

impl fmt::Display for MorphTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.pos.code(), self.parse_code())
    }
}

// ── Filter ───────────────────────────────────────────────────────────

/// A conjunction of field constraints over [`MorphTag`]. Unset fields match
/// anything.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MorphFilter {
    pub pos: Option<PartOfSpeech>,
    pub person: Option<Person>,
    pub tense: Option<Tense>,
    pub voice: Option<Voice>,
    pub mood: Option<Mood>,
    pub case: Option<Case>,
    pub number: Option<Number>,
    pub gender: Option<Gender>,
    pub degree: Option<Degree>,
}

impl MorphFilter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn pos(mut self, pos: PartOfSpeech) -> Self {
        self.pos = Some(pos);
        self
    }

    #[must_use]
    pub fn person(mut self, person: Person) -> Self {
        self.person = Some(person);
        self
    }

    #[must_use]
    pub fn tense(mut self, tense: Tense) -> Self {
        self.tense = Some(tense);
        self
    }

    #[must_use]
    pub fn voice(mut self, voice: Voice) -> Self {
        self.voice = Some(voice);
        self
    }

    #[must_use]
    pub fn mood(mut self, mood: Mood) -> Self {
        self.mood = Some(mood);
        self
    }

    #[must_use]
    pub fn case(mut self, case: Case) -> Self {
        self.case = Some(case);
        self
    }

    #[must_use]
    pub fn number(mut self, number: Number) -> Self {
        self.number = Some(number);
        self
    }

    #[must_use]
    pub fn gender(mut self, gender: Gender) -> Self {
        self.gender = Some(gender);
        self
    }

    #[must_use]
    pub fn degree(mut self, degree: Degree) -> Self {
        self.degree = Some(degree);
        self
    }

    /// True when no field is constrained.
    #[must_use]
    pub fn is_wildcard(&self) -> bool {
        *self == Self::default()
    }

    #[must_use]
    pub fn matches(&self, tag: &MorphTag) -> bool {
        fn field<T: PartialEq>(want: Option<T>, have: Option<T>) -> bool {
            want.is_none() || want == have
        }
        field(self.pos, Some(tag.pos))
            && field(self.person, tag.person)
            && field(self.tense, tag.tense)
            && field(self.voice, tag.voice)
            && field(self.mood, tag.mood)
            && field(self.case, tag.case)
            && field(self.number, tag.number)
            && field(self.gender, tag.gender)
            && field(self.degree, tag.degree)
    }
}

impl FromStr for MorphFilter {
    type Err = InvalidFilter;

    /// Parse comma-separated `field=value` pairs, e.g.
    /// `pos=verb, tense=aorist, mood=P`. Values may contain spaces
    /// (`pos=definite article`). An empty string is the wildcard filter.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: String| InvalidFilter {
            input: s.to_string(),
            reason,
        };

        let mut filter = Self::default();
        for pair in s.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            let (key, value) = pair
                .split_once('=')
                .ok_or_else(|| invalid(format!("expected field=value, found '{pair}'")))?;
            let key = key.trim().to_lowercase();
            match key.as_str() {
                "pos" | "part" => filter.pos = Some(value.parse().map_err(invalid)?),
                "person" => filter.person = Some(value.parse().map_err(invalid)?),
                "tense" => filter.tense = Some(value.parse().map_err(invalid)?),
                "voice" => filter.voice = Some(value.parse().map_err(invalid)?),
                "mood" => filter.mood = Some(value.parse().map_err(invalid)?),
                "case" => filter.case = Some(value.parse().map_err(invalid)?),
                "number" => filter.number = Some(value.parse().map_err(invalid)?),
                "gender" => filter.gender = Some(value.parse().map_err(invalid)?),
                "degree" => filter.degree = Some(value.parse().map_err(invalid)?),
                other => return Err(invalid(format!("unknown field '{other}'"))),
            }
        }
        Ok(filter)
    }
}

/// Lowercase and drop separators so `Definite Article`, `definite_article`
/// and `RA`/`ra` compare by content.
fn squash(s: &str) -> String {
    s.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

// ── Tests ────────────────────────────────────────────────────────────
