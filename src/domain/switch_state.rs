//! Switch-state model of the three-level T-type conversion stage.
//!
//! Each phase leg has four switching positions: the upper and lower main
//! devices connect the output to the DC rails, and the back-to-back
//! bidirectional pair connects it to the neutral point. The [`StateTable`]
//! maps every [`OutputLevel`] to the conduction pattern that produces it.

use std::{fmt, str::FromStr};

use thiserror::Error;

use crate::domain::{ConfigError, RequestError};

/// One of the three voltage levels a phase leg can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum OutputLevel {
    /// Output tied to the positive rail (`P`).
    Positive,
    /// Output clamped to the neutral point (`O`).
    Zero,
    /// Output tied to the negative rail (`N`).
    Negative,
}

impl OutputLevel {
    /// Every level, in display order.
    pub const ALL: [Self; 3] = [Self::Positive, Self::Zero, Self::Negative];

    const fn index(self) -> usize {
        match self {
            Self::Positive => 0,
            Self::Zero => 1,
            Self::Negative => 2,
        }
    }

    /// The one-letter symbol used in switching tables (`P`, `O`, `N`).
    #[must_use]
    pub const fn symbol(self) -> char {
        match self {
            Self::Positive => 'P',
            Self::Zero => 'O',
            Self::Negative => 'N',
        }
    }

    /// Short label used on selector buttons.
    #[must_use]
    pub const fn short_label(self) -> &'static str {
        match self {
            Self::Positive => "+V",
            Self::Zero => "0V",
            Self::Negative => "-V",
        }
    }

    /// The bus node the output terminal is connected to at this level.
    #[must_use]
    pub const fn bus_node(self) -> BusNode {
        match self {
            Self::Positive => BusNode::PositiveRail,
            Self::Zero => BusNode::NeutralPoint,
            Self::Negative => BusNode::NegativeRail,
        }
    }
}

impl fmt::Display for OutputLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Positive => "positive",
            Self::Zero => "zero",
            Self::Negative => "negative",
        })
    }
}

impl FromStr for OutputLevel {
    type Err = RequestError;

    /// Accepts the symbol, the full name or the sign, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "p" | "positive" | "+" | "+v" => Ok(Self::Positive),
            "o" | "zero" | "neutral" | "0" | "0v" => Ok(Self::Zero),
            "n" | "negative" | "-" | "-v" => Ok(Self::Negative),
            _ => Err(RequestError::UnknownLevel(s.to_string())),
        }
    }
}

/// A DC-link node the output can be connected to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusNode {
    /// `+Vdc/2`
    PositiveRail,
    /// `NP`
    NeutralPoint,
    /// `-Vdc/2`
    NegativeRail,
}

impl fmt::Display for BusNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::PositiveRail => "+Vdc/2",
            Self::NeutralPoint => "NP",
            Self::NegativeRail => "-Vdc/2",
        })
    }
}

/// A switching position within one phase leg.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DevicePosition {
    /// Upper main switch, positive rail to output.
    UpperMain,
    /// Lower main switch, output to negative rail.
    LowerMain,
    /// First half of the back-to-back neutral-point switch.
    BidirectionalA,
    /// Second half of the back-to-back neutral-point switch.
    BidirectionalB,
}

impl DevicePosition {
    /// Every position, in schematic order.
    pub const ALL: [Self; 4] = [
        Self::UpperMain,
        Self::LowerMain,
        Self::BidirectionalA,
        Self::BidirectionalB,
    ];

    const fn index(self) -> usize {
        match self {
            Self::UpperMain => 0,
            Self::LowerMain => 1,
            Self::BidirectionalA => 2,
            Self::BidirectionalB => 3,
        }
    }

    /// Schematic designator.
    #[must_use]
    pub const fn designator(self) -> &'static str {
        match self {
            Self::UpperMain => "T1",
            Self::LowerMain => "T4",
            Self::BidirectionalA => "T2",
            Self::BidirectionalB => "T3",
        }
    }

    /// What the position does in the leg.
    #[must_use]
    pub const fn role(self) -> &'static str {
        match self {
            Self::UpperMain => "upper main",
            Self::LowerMain => "lower main",
            Self::BidirectionalA | Self::BidirectionalB => "bidirectional (NP clamp)",
        }
    }

    /// Voltage the position must block when off.
    ///
    /// The neutral-point clamp sits across the full DC link, the main
    /// devices across half of it.
    #[must_use]
    pub const fn blocking_voltage(self) -> &'static str {
        match self {
            Self::UpperMain | Self::LowerMain => "Vdc/2",
            Self::BidirectionalA | Self::BidirectionalB => "Vdc",
        }
    }

    /// How the position is built from discrete devices.
    ///
    /// The bidirectional pair shares one 2S2P arrangement of four devices.
    #[must_use]
    pub const fn device_arrangement(self) -> &'static str {
        match self {
            Self::UpperMain | Self::LowerMain => "2x parallel",
            Self::BidirectionalA | Self::BidirectionalB => "4x (2S2P)",
        }
    }
}

impl fmt::Display for DevicePosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.designator())
    }
}

/// Discrete devices per phase leg.
pub const DEVICES_PER_PHASE: usize = 12;

/// Conduction flag for every [`DevicePosition`], indexed by position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Conduction([bool; 4]);

impl Conduction {
    /// Build a conduction pattern from explicit flags.
    #[must_use]
    pub const fn new(
        upper_main: bool,
        lower_main: bool,
        bidirectional_a: bool,
        bidirectional_b: bool,
    ) -> Self {
        Self([upper_main, lower_main, bidirectional_a, bidirectional_b])
    }

    /// Whether the device at `position` conducts.
    #[must_use]
    pub const fn is_on(self, position: DevicePosition) -> bool {
        self.0[position.index()]
    }

    /// The conducting positions, in schematic order.
    pub fn conducting(self) -> impl Iterator<Item = DevicePosition> {
        DevicePosition::ALL
            .into_iter()
            .filter(move |&position| self.is_on(position))
    }
}

/// The device pattern and output voltage for one [`OutputLevel`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateDefinition {
    level: OutputLevel,
    conduction: Conduction,
    voltage: &'static str,
    reference: &'static str,
}

impl StateDefinition {
    /// Creates a definition.
    ///
    /// `voltage` is the symbolic output label (e.g. `+Vdc/2`), `reference`
    /// the static nominal value shown next to it.
    #[must_use]
    pub const fn new(
        level: OutputLevel,
        conduction: Conduction,
        voltage: &'static str,
        reference: &'static str,
    ) -> Self {
        Self {
            level,
            conduction,
            voltage,
            reference,
        }
    }

    /// The level this definition produces.
    #[must_use]
    pub const fn level(&self) -> OutputLevel {
        self.level
    }

    /// The conduction pattern.
    #[must_use]
    pub const fn conduction(&self) -> Conduction {
        self.conduction
    }

    /// Whether the device at `position` conducts.
    #[must_use]
    pub const fn is_on(&self, position: DevicePosition) -> bool {
        self.conduction.is_on(position)
    }

    /// Symbolic output voltage label.
    #[must_use]
    pub const fn voltage(&self) -> &'static str {
        self.voltage
    }

    /// Static nominal output voltage.
    #[must_use]
    pub const fn reference(&self) -> &'static str {
        self.reference
    }

    /// Checks the definition against the topology rules.
    ///
    /// # Errors
    ///
    /// Returns the first [`StateViolation`] found.
    pub const fn check(&self) -> Result<(), StateViolation> {
        let upper = self.is_on(DevicePosition::UpperMain);
        let lower = self.is_on(DevicePosition::LowerMain);
        let bidir_a = self.is_on(DevicePosition::BidirectionalA);
        let bidir_b = self.is_on(DevicePosition::BidirectionalB);

        if upper && lower {
            return Err(StateViolation::ShootThrough);
        }
        if bidir_a != bidir_b {
            return Err(StateViolation::PartialBidirectional);
        }

        match self.level {
            OutputLevel::Zero => {
                if upper || lower {
                    return Err(StateViolation::MainOnAtZero);
                }
                if !bidir_a {
                    return Err(StateViolation::BidirectionalOffAtZero);
                }
            }
            OutputLevel::Positive | OutputLevel::Negative => {
                if bidir_a {
                    return Err(StateViolation::BidirectionalOnAtRail);
                }
                let expected_upper = matches!(self.level, OutputLevel::Positive);
                if upper != expected_upper || lower == expected_upper {
                    return Err(StateViolation::WrongMainDevice);
                }
            }
        }

        Ok(())
    }

    /// Whether the definition satisfies the topology rules.
    #[must_use]
    pub const fn validate(&self) -> bool {
        self.check().is_ok()
    }
}

/// A way in which a [`StateDefinition`] breaks the topology rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum StateViolation {
    /// Both main devices conduct, shorting the DC link.
    #[error("upper and lower main devices conduct together (shoot-through)")]
    ShootThrough,
    /// Only one half of the bidirectional pair conducts.
    #[error("bidirectional pair is partially conducting")]
    PartialBidirectional,
    /// The bidirectional pair conducts at a rail level.
    #[error("bidirectional pair conducts at a rail level")]
    BidirectionalOnAtRail,
    /// The rail level is not produced by exactly its own main device.
    #[error("rail level is not produced by exactly its own main device")]
    WrongMainDevice,
    /// A main device conducts at the zero level.
    #[error("a main device conducts at the zero level")]
    MainOnAtZero,
    /// The bidirectional pair is off at the zero level.
    #[error("bidirectional pair does not conduct at the zero level")]
    BidirectionalOffAtZero,
}

const BUILTIN: [StateDefinition; 3] = [
    StateDefinition::new(
        OutputLevel::Positive,
        Conduction::new(true, false, false, false),
        "+Vdc/2",
        "+425 V",
    ),
    StateDefinition::new(
        OutputLevel::Zero,
        Conduction::new(false, false, true, true),
        "0 (neutral)",
        "0 V",
    ),
    StateDefinition::new(
        OutputLevel::Negative,
        Conduction::new(false, true, false, false),
        "-Vdc/2",
        "-425 V",
    ),
];

/// The closed table of [`StateDefinition`]s, one per [`OutputLevel`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateTable {
    definitions: [StateDefinition; 3],
}

impl StateTable {
    /// Builds a table from definitions given in any order.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if a level is missing or defined twice, or if
    /// any definition breaks the topology rules.
    pub fn new(
        definitions: impl IntoIterator<Item = StateDefinition>,
    ) -> Result<Self, ConfigError> {
        let mut slots: [Option<StateDefinition>; 3] = [None; 3];

        for definition in definitions {
            let level = definition.level();
            definition
                .check()
                .map_err(|violation| ConfigError::InvalidState { level, violation })?;

            let slot = &mut slots[level.index()];
            if slot.is_some() {
                return Err(ConfigError::DuplicateLevel(level));
            }
            *slot = Some(definition);
        }

        let [Some(positive), Some(zero), Some(negative)] = slots else {
            let missing = OutputLevel::ALL
                .into_iter()
                .find(|level| slots[level.index()].is_none())
                .unwrap_or(OutputLevel::Zero);
            return Err(ConfigError::MissingLevel(missing));
        };

        Ok(Self {
            definitions: [positive, zero, negative],
        })
    }

    /// The product's switching table.
    ///
    /// # Errors
    ///
    /// Fails only if the built-in definitions are inconsistent.
    pub fn builtin() -> Result<Self, ConfigError> {
        Self::new(BUILTIN)
    }

    /// The product's switching definitions, before any checks.
    #[must_use]
    pub const fn builtin_definitions() -> [StateDefinition; 3] {
        BUILTIN
    }

    /// The definition for `level`.
    #[must_use]
    pub const fn select_level(&self, level: OutputLevel) -> &StateDefinition {
        &self.definitions[level.index()]
    }

    /// All definitions, in [`OutputLevel::ALL`] order.
    pub fn definitions(&self) -> impl Iterator<Item = &StateDefinition> {
        self.definitions.iter()
    }
}

/// A state table together with the currently selected level.
#[derive(Debug, Clone)]
pub struct SwitchPanel {
    table: StateTable,
    current: OutputLevel,
}

impl SwitchPanel {
    /// Creates a panel showing `initial`.
    #[must_use]
    pub const fn new(table: StateTable, initial: OutputLevel) -> Self {
        Self {
            table,
            current: initial,
        }
    }

    /// The selected level.
    #[must_use]
    pub const fn current_level(&self) -> OutputLevel {
        self.current
    }

    /// The definition for the selected level.
    #[must_use]
    pub const fn current(&self) -> &StateDefinition {
        self.table.select_level(self.current)
    }

    /// The underlying table.
    #[must_use]
    pub const fn table(&self) -> &StateTable {
        &self.table
    }

    /// Selects `level` and returns its definition.
    pub const fn select(&mut self, level: OutputLevel) -> &StateDefinition {
        self.current = level;
        self.table.select_level(level)
    }

    /// Parses and selects a level from a raw request.
    ///
    /// # Errors
    ///
    /// Returns [`RequestError::UnknownLevel`] and keeps the current selection
    /// if `raw` names no level.
    pub fn select_str(&mut self, raw: &str) -> Result<&StateDefinition, RequestError> {
        let level = raw.parse()?;
        Ok(self.select(level))
    }
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;

    fn table() -> StateTable {
        StateTable::builtin().unwrap()
    }

    #[test]
    fn builtin_definitions_are_valid() {
        for definition in table().definitions() {
            assert!(definition.validate(), "{}", definition.level());
        }
    }

    #[test_case(OutputLevel::Positive; "positive")]
    #[test_case(OutputLevel::Zero; "zero")]
    #[test_case(OutputLevel::Negative; "negative")]
    fn selected_level_never_shoots_through(level: OutputLevel) {
        let table = table();
        let definition = table.select_level(level);
        assert_eq!(definition.level(), level);
        assert!(
            !(definition.is_on(DevicePosition::UpperMain)
                && definition.is_on(DevicePosition::LowerMain))
        );
        assert_eq!(
            definition.is_on(DevicePosition::BidirectionalA),
            definition.is_on(DevicePosition::BidirectionalB)
        );
    }

    #[test]
    fn zero_level_clamps_to_neutral_point() {
        let table = table();
        let zero = table.select_level(OutputLevel::Zero);
        assert!(zero.is_on(DevicePosition::BidirectionalA));
        assert!(zero.is_on(DevicePosition::BidirectionalB));
        assert!(!zero.is_on(DevicePosition::UpperMain));
        assert!(!zero.is_on(DevicePosition::LowerMain));
        assert_eq!(OutputLevel::Zero.bus_node(), BusNode::NeutralPoint);
    }

    #[test]
    fn rail_levels_use_their_own_main_device() {
        let table = table();
        let positive: Vec<_> = table
            .select_level(OutputLevel::Positive)
            .conduction()
            .conducting()
            .collect();
        let negative: Vec<_> = table
            .select_level(OutputLevel::Negative)
            .conduction()
            .conducting()
            .collect();
        assert_eq!(positive, [DevicePosition::UpperMain]);
        assert_eq!(negative, [DevicePosition::LowerMain]);
    }

    #[test_case(OutputLevel::Positive, Conduction::new(true, true, false, false), StateViolation::ShootThrough; "shoot-through at positive")]
    #[test_case(OutputLevel::Zero, Conduction::new(true, true, true, true), StateViolation::ShootThrough; "shoot-through at zero")]
    #[test_case(OutputLevel::Positive, Conduction::new(true, false, true, true), StateViolation::BidirectionalOnAtRail; "clamp on at positive")]
    #[test_case(OutputLevel::Negative, Conduction::new(false, true, true, true), StateViolation::BidirectionalOnAtRail; "clamp on at negative")]
    #[test_case(OutputLevel::Zero, Conduction::new(false, false, true, false), StateViolation::PartialBidirectional; "half clamp")]
    #[test_case(OutputLevel::Positive, Conduction::new(false, true, false, false), StateViolation::WrongMainDevice; "wrong rail")]
    #[test_case(OutputLevel::Negative, Conduction::new(false, false, false, false), StateViolation::WrongMainDevice; "nothing on at rail")]
    #[test_case(OutputLevel::Zero, Conduction::new(false, false, false, false), StateViolation::BidirectionalOffAtZero; "floating at zero")]
    #[test_case(OutputLevel::Zero, Conduction::new(true, false, true, true), StateViolation::MainOnAtZero; "main on at zero")]
    fn violations_are_rejected(
        level: OutputLevel,
        conduction: Conduction,
        expected: StateViolation,
    ) {
        let definition = StateDefinition::new(level, conduction, "x", "x");
        assert!(!definition.validate());
        assert_eq!(definition.check(), Err(expected));
    }

    #[test_case(DevicePosition::UpperMain, "Vdc/2", "2x parallel"; "upper main")]
    #[test_case(DevicePosition::LowerMain, "Vdc/2", "2x parallel"; "lower main")]
    #[test_case(DevicePosition::BidirectionalA, "Vdc", "4x (2S2P)"; "clamp a")]
    #[test_case(DevicePosition::BidirectionalB, "Vdc", "4x (2S2P)"; "clamp b")]
    fn device_summary(position: DevicePosition, blocking: &str, arrangement: &str) {
        assert_eq!(position.blocking_voltage(), blocking);
        assert_eq!(position.device_arrangement(), arrangement);
    }

    #[test]
    fn table_requires_every_level() {
        let error = StateTable::new(BUILTIN.into_iter().take(2)).unwrap_err();
        assert_eq!(error, ConfigError::MissingLevel(OutputLevel::Negative));
    }

    #[test]
    fn table_rejects_duplicate_level() {
        let definitions = [BUILTIN[0], BUILTIN[1], BUILTIN[2], BUILTIN[1]];
        let error = StateTable::new(definitions).unwrap_err();
        assert_eq!(error, ConfigError::DuplicateLevel(OutputLevel::Zero));
    }

    #[test]
    fn table_rejects_invalid_definition() {
        let bad = StateDefinition::new(
            OutputLevel::Positive,
            Conduction::new(true, true, false, false),
            "+Vdc/2",
            "+425 V",
        );
        let error = StateTable::new([bad, BUILTIN[1], BUILTIN[2]]).unwrap_err();
        assert_eq!(
            error,
            ConfigError::InvalidState {
                level: OutputLevel::Positive,
                violation: StateViolation::ShootThrough,
            }
        );
    }

    #[test]
    fn table_accepts_any_order() {
        let reversed = StateTable::new([BUILTIN[2], BUILTIN[0], BUILTIN[1]]).unwrap();
        assert_eq!(reversed, table());
    }

    #[test_case("P", OutputLevel::Positive; "symbol")]
    #[test_case("negative", OutputLevel::Negative; "name")]
    #[test_case("o", OutputLevel::Zero; "lowercase symbol")]
    #[test_case("+", OutputLevel::Positive; "sign")]
    #[test_case(" Zero ", OutputLevel::Zero; "padded")]
    fn parses_level(raw: &str, expected: OutputLevel) {
        assert_eq!(raw.parse::<OutputLevel>().unwrap(), expected);
    }

    #[test]
    fn unknown_level_keeps_selection() {
        let mut panel = SwitchPanel::new(table(), OutputLevel::Zero);
        panel.select(OutputLevel::Positive);

        let error = panel.select_str("Q").unwrap_err();

        assert_eq!(error, RequestError::UnknownLevel("Q".to_string()));
        assert_eq!(panel.current_level(), OutputLevel::Positive);
    }

    #[test]
    fn select_str_changes_current_definition() {
        let mut panel = SwitchPanel::new(table(), OutputLevel::Zero);
        let voltage = panel.select_str("N").unwrap().voltage();
        assert_eq!(voltage, "-Vdc/2");
        assert_eq!(panel.current().level(), OutputLevel::Negative);
    }
}
