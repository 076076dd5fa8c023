//! Flag vocabularies attached to candidate matches
//!
//! Three closed vocabularies share a single enum: common flags apply to both
//! candidate kinds, the rest are town- or country-specific. Flags carry no
//! payload; presence is the only signal. `FlagSet` stores them as a bitmask,
//! so inserting twice is a no-op and iteration order (declaration order) is
//! the deterministic serialization order.

use serde::de::{SeqAccess, Visitor};
use serde::ser::SerializeSeq;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::ops::{BitOr, BitOrAssign};

/// Contextual annotation for a candidate match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[repr(u8)]
pub enum Flag {
    // Common to both sides
    SeparatorTypo = 0,
    InsideAnotherWord,
    InFirstThird,
    InLastThird,
    Short,
    InsideHigherRankedMatch,
    InsideLowerRankedMatch,
    ReasonableMistake,
    InsideStreet,
    CommonProvinceAlias,
    UncommonProvinceAlias,
    // Town-specific
    CountryPresent,
    TaggerCountryPresent,
    VeryCloseToCountry,
    SameLineAsCountry,
    Metropolis,
    SmallTown,
    FromExtendedData,
    AloneOnLine,
    NotLargestTownWithName,
    PostcodeForTownFound,
    SuggestedCountryPresent,
    // Country-specific
    TownPresent,
    VeryCloseToTown,
    SameLineAsTown,
    PostalCodePresent,
    IbanPresent,
    PhonePrefixPresent,
    DomainPresent,
    TaggerStronglyAgrees,
    TaggerAgrees,
    TaggerDoesntDisagree,
    SuggestedCountry,
    GeneratedBySuggestedCountry,
}

impl Flag {
    /// All flags in declaration order.
    pub const ALL: [Flag; 34] = [
        Flag::SeparatorTypo,
        Flag::InsideAnotherWord,
        Flag::InFirstThird,
        Flag::InLastThird,
        Flag::Short,
        Flag::InsideHigherRankedMatch,
        Flag::InsideLowerRankedMatch,
        Flag::ReasonableMistake,
        Flag::InsideStreet,
        Flag::CommonProvinceAlias,
        Flag::UncommonProvinceAlias,
        Flag::CountryPresent,
        Flag::TaggerCountryPresent,
        Flag::VeryCloseToCountry,
        Flag::SameLineAsCountry,
        Flag::Metropolis,
        Flag::SmallTown,
        Flag::FromExtendedData,
        Flag::AloneOnLine,
        Flag::NotLargestTownWithName,
        Flag::PostcodeForTownFound,
        Flag::SuggestedCountryPresent,
        Flag::TownPresent,
        Flag::VeryCloseToTown,
        Flag::SameLineAsTown,
        Flag::PostalCodePresent,
        Flag::IbanPresent,
        Flag::PhonePrefixPresent,
        Flag::DomainPresent,
        Flag::TaggerStronglyAgrees,
        Flag::TaggerAgrees,
        Flag::TaggerDoesntDisagree,
        Flag::SuggestedCountry,
        Flag::GeneratedBySuggestedCountry,
    ];

    /// Stable upper-case name, matching the serialized form.
    pub fn name(self) -> &'static str {
        match self {
            Flag::SeparatorTypo => "SEPARATOR_TYPO",
            Flag::InsideAnotherWord => "INSIDE_ANOTHER_WORD",
            Flag::InFirstThird => "IN_FIRST_THIRD",
            Flag::InLastThird => "IN_LAST_THIRD",
            Flag::Short => "SHORT",
            Flag::InsideHigherRankedMatch => "INSIDE_HIGHER_RANKED_MATCH",
            Flag::InsideLowerRankedMatch => "INSIDE_LOWER_RANKED_MATCH",
            Flag::ReasonableMistake => "REASONABLE_MISTAKE",
            Flag::InsideStreet => "INSIDE_STREET",
            Flag::CommonProvinceAlias => "COMMON_PROVINCE_ALIAS",
            Flag::UncommonProvinceAlias => "UNCOMMON_PROVINCE_ALIAS",
            Flag::CountryPresent => "COUNTRY_PRESENT",
            Flag::TaggerCountryPresent => "TAGGER_COUNTRY_PRESENT",
            Flag::VeryCloseToCountry => "VERY_CLOSE_TO_COUNTRY",
            Flag::SameLineAsCountry => "SAME_LINE_AS_COUNTRY",
            Flag::Metropolis => "METROPOLIS",
            Flag::SmallTown => "SMALL_TOWN",
            Flag::FromExtendedData => "FROM_EXTENDED_DATA",
            Flag::AloneOnLine => "ALONE_ON_LINE",
            Flag::NotLargestTownWithName => "NOT_LARGEST_TOWN_WITH_NAME",
            Flag::PostcodeForTownFound => "POSTCODE_FOR_TOWN_FOUND",
            Flag::SuggestedCountryPresent => "SUGGESTED_COUNTRY_PRESENT",
            Flag::TownPresent => "TOWN_PRESENT",
            Flag::VeryCloseToTown => "VERY_CLOSE_TO_TOWN",
            Flag::SameLineAsTown => "SAME_LINE_AS_TOWN",
            Flag::PostalCodePresent => "POSTAL_CODE_PRESENT",
            Flag::IbanPresent => "IBAN_PRESENT",
            Flag::PhonePrefixPresent => "PHONE_PREFIX_PRESENT",
            Flag::DomainPresent => "DOMAIN_PRESENT",
            Flag::TaggerStronglyAgrees => "TAGGER_STRONGLY_AGREES",
            Flag::TaggerAgrees => "TAGGER_AGREES",
            Flag::TaggerDoesntDisagree => "TAGGER_DOESNT_DISAGREE",
            Flag::SuggestedCountry => "SUGGESTED_COUNTRY",
            Flag::GeneratedBySuggestedCountry => "GENERATED_BY_SUGGESTED_COUNTRY",
        }
    }

    fn bit(self) -> u64 {
        1u64 << (self as u8)
    }
}

impl fmt::Display for Flag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Deduplicated set of flags, backed by a bitmask.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct FlagSet(u64);

impl FlagSet {
    /// The empty set.
    pub const fn empty() -> Self {
        FlagSet(0)
    }

    pub fn insert(&mut self, flag: Flag) {
        self.0 |= flag.bit();
    }

    pub fn remove(&mut self, flag: Flag) {
        self.0 &= !flag.bit();
    }

    pub fn contains(&self, flag: Flag) -> bool {
        self.0 & flag.bit() != 0
    }

    /// True when any of the given flags is present.
    pub fn contains_any<I: IntoIterator<Item = Flag>>(&self, flags: I) -> bool {
        flags.into_iter().any(|f| self.contains(f))
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn clear(&mut self) {
        self.0 = 0;
    }

    /// Flags in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = Flag> + '_ {
        Flag::ALL.into_iter().filter(|f| self.contains(*f))
    }
}

impl From<Flag> for FlagSet {
    fn from(flag: Flag) -> Self {
        FlagSet(flag.bit())
    }
}

impl FromIterator<Flag> for FlagSet {
    fn from_iter<I: IntoIterator<Item = Flag>>(iter: I) -> Self {
        let mut set = FlagSet::empty();
        for flag in iter {
            set.insert(flag);
        }
        set
    }
}

impl Extend<Flag> for FlagSet {
    fn extend<I: IntoIterator<Item = Flag>>(&mut self, iter: I) {
        for flag in iter {
            self.insert(flag);
        }
    }
}

impl BitOr for FlagSet {
    type Output = FlagSet;

    fn bitor(self, rhs: FlagSet) -> FlagSet {
        FlagSet(self.0 | rhs.0)
    }
}

impl BitOrAssign for FlagSet {
    fn bitor_assign(&mut self, rhs: FlagSet) {
        self.0 |= rhs.0;
    }
}

impl fmt::Debug for FlagSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl Serialize for FlagSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.len()))?;
        for flag in self.iter() {
            seq.serialize_element(&flag)?;
        }
        seq.end()
    }
}

impl<'de> Deserialize<'de> for FlagSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct FlagSetVisitor;

        impl<'de> Visitor<'de> for FlagSetVisitor {
            type Value = FlagSet;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a sequence of flag names")
            }

            fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<FlagSet, A::Error> {
                let mut set = FlagSet::empty();
                while let Some(flag) = seq.next_element::<Flag>()? {
                    set.insert(flag);
                }
                Ok(set)
            }
        }

        deserializer.deserialize_seq(FlagSetVisitor)
    }
}
