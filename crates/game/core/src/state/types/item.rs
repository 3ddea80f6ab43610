//! Item stacks and the two hand slots that can hold them.

use bitflags::bitflags;
use strum::{Display, EnumString};

/// Item material as reported by the host.
///
/// Only the qualifying item and the materials used by bundled scenarios are
/// named.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(serialize_all = "snake_case")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ItemKind {
    TotemOfUndying,
    Shield,
    Sword,
    Bread,
    Torch,
}

/// A typed stack of items held in a slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ItemStack {
    pub kind: ItemKind,
    pub amount: u16,
}

impl ItemStack {
    pub const fn new(kind: ItemKind, amount: u16) -> Self {
        Self { kind, amount }
    }

    /// Returns true if this stack is of `kind` and holds at least one unit.
    pub fn is(&self, kind: ItemKind) -> bool {
        self.kind == kind && self.amount > 0
    }

    /// Returns the stack left after removing one unit.
    ///
    /// `None` means the slot becomes empty and should be cleared rather than
    /// written back with a zero count.
    #[must_use]
    pub fn decremented(self) -> Option<Self> {
        match self.amount {
            0 | 1 => None,
            n => Some(Self {
                amount: n - 1,
                ..self
            }),
        }
    }
}

/// Equipment slot that can hold a qualifying item.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display, EnumString)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Hand {
    #[strum(to_string = "main hand", serialize = "main_hand")]
    MainHand,
    #[strum(to_string = "offhand", serialize = "off_hand")]
    OffHand,
}

impl Hand {
    /// Order in which hands are checked when consuming at death.
    /// The offhand always wins when both hands qualify.
    pub const CONSUMPTION_ORDER: [Hand; 2] = [Hand::OffHand, Hand::MainHand];

    pub const fn flag(self) -> HandFlags {
        match self {
            Hand::MainHand => HandFlags::MAIN_HAND,
            Hand::OffHand => HandFlags::OFF_HAND,
        }
    }
}

bitflags! {
    /// Which hands held a qualifying item at a given moment.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct HandFlags: u8 {
        const MAIN_HAND = 1 << 0;
        const OFF_HAND = 1 << 1;
    }
}

impl HandFlags {
    /// The hand that would be named first in diagnostics: offhand if set,
    /// otherwise main hand.
    pub fn preferred(self) -> Option<Hand> {
        Hand::CONSUMPTION_ORDER
            .into_iter()
            .find(|hand| self.contains(hand.flag()))
    }
}

/// Contents of both hand slots.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HandSlots {
    #[cfg_attr(feature = "serde", serde(default))]
    pub main_hand: Option<ItemStack>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub off_hand: Option<ItemStack>,
}

impl HandSlots {
    pub fn get(&self, hand: Hand) -> Option<ItemStack> {
        match hand {
            Hand::MainHand => self.main_hand,
            Hand::OffHand => self.off_hand,
        }
    }

    pub fn set(&mut self, hand: Hand, stack: Option<ItemStack>) {
        match hand {
            Hand::MainHand => self.main_hand = stack,
            Hand::OffHand => self.off_hand = stack,
        }
    }

    /// Returns the hands currently holding a non-empty stack of `kind`.
    pub fn holding(&self, kind: ItemKind) -> HandFlags {
        Hand::CONSUMPTION_ORDER
            .into_iter()
            .filter(|&hand| self.get(hand).is_some_and(|stack| stack.is(kind)))
            .fold(HandFlags::empty(), |flags, hand| flags | hand.flag())
    }
}
