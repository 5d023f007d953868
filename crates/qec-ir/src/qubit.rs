//! Qubit and classical bit types.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for a qubit within a circuit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct QubitId(pub u32);

impl QubitId {
    /// Position of this qubit in the state vector (little-endian).
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for QubitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "q{}", self.0)
    }
}

impl From<u32> for QubitId {
    fn from(id: u32) -> Self {
        QubitId(id)
    }
}

/// Unique identifier for a classical bit within a circuit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ClbitId(pub u32);

impl ClbitId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for ClbitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "c{}", self.0)
    }
}

impl From<u32> for ClbitId {
    fn from(id: u32) -> Self {
        ClbitId(id)
    }
}

/// A quantum bit with optional register membership.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Qubit {
    /// The unique identifier.
    pub id: QubitId,
    /// The name of the register this qubit belongs to, if any.
    pub register: Option<String>,
    /// The index within the register, if any.
    pub index: Option<u32>,
}

impl Qubit {
    /// Create a new qubit with just an id.
    pub fn new(id: QubitId) -> Self {
        Self {
            id,
            register: None,
            index: None,
        }
    }

    /// Create a new qubit with register membership.
    pub fn with_register(id: QubitId, register: impl Into<String>, index: u32) -> Self {
        Self {
            id,
            register: Some(register.into()),
            index: Some(index),
        }
    }
}

impl fmt::Display for Qubit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.register, self.index) {
            (Some(reg), Some(idx)) => write!(f, "{reg}[{idx}]"),
            _ => write!(f, "{}", self.id),
        }
    }
}

/// A classical bit with optional register membership.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Clbit {
    pub id: ClbitId,
    pub register: Option<String>,
    pub index: Option<u32>,
}

impl Clbit {
    pub fn new(id: ClbitId) -> Self {
        Self {
            id,
            register: None,
            index: None,
        }
    }

    pub fn with_register(id: ClbitId, register: impl Into<String>, index: u32) -> Self {
        Self {
            id,
            register: Some(register.into()),
            index: Some(index),
        }
    }
}

impl fmt::Display for Clbit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.register, self.index) {
            (Some(reg), Some(idx)) => write!(f, "{reg}[{idx}]"),
            _ => write!(f, "{}", self.id),
        }
    }
}

/// A named group of qubits, declared as `qubit[n] name;`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuantumRegister {
    pub name: String,
    pub qubits: Vec<QubitId>,
}

impl QuantumRegister {
    pub fn size(&self) -> usize {
        self.qubits.len()
    }

    /// The qubit at `index` within this register.
    pub fn get(&self, index: usize) -> Option<QubitId> {
        self.qubits.get(index).copied()
    }
}

/// A named group of classical bits, declared as `bit[n] name;`.
///
/// Bit `i` of the register carries weight `2^i` when the register is read
/// as an integer, which is how classical conditions compare against it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassicalRegister {
    pub name: String,
    pub clbits: Vec<ClbitId>,
}

impl ClassicalRegister {
    pub fn size(&self) -> usize {
        self.clbits.len()
    }

    pub fn get(&self, index: usize) -> Option<ClbitId> {
        self.clbits.get(index).copied()
    }

    /// Largest value representable by this register, saturating at `u64::MAX`.
    pub fn max_value(&self) -> u64 {
        match self.clbits.len() {
            0 => 0,
            n if n >= 64 => u64::MAX,
            n => (1u64 << n) - 1,
        }
    }

    /// Read the register's integer value from a classical memory slice.
    ///
    /// Bits beyond the end of `memory` read as zero.
    pub fn value_in(&self, memory: &[bool]) -> u64 {
        self.clbits
            .iter()
            .enumerate()
            .take(64)
            .filter(|(_, c)| memory.get(c.index()).copied().unwrap_or(false))
            .fold(0u64, |acc, (i, _)| acc | (1u64 << i))
    }

    /// Render the register as a bitstring, most significant bit first.
    pub fn bitstring_in(&self, memory: &[bool]) -> String {
        self.clbits
            .iter()
            .rev()
            .map(|c| {
                if memory.get(c.index()).copied().unwrap_or(false) {
                    '1'
                } else {
                    '0'
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_qubit_display() {
        let q = Qubit::new(QubitId(0));
        assert_eq!(format!("{q}"), "q0");

        let q_reg = Qubit::with_register(QubitId(1), "qr", 0);
        assert_eq!(format!("{q_reg}"), "qr[0]");
    }

    #[test]
    fn test_clbit_display() {
        let c = Clbit::new(ClbitId(0));
        assert_eq!(format!("{c}"), "c0");

        let c_reg = Clbit::with_register(ClbitId(1), "syndrome_register", 1);
        assert_eq!(format!("{c_reg}"), "syndrome_register[1]");
    }

    #[test]
    fn test_register_value_little_endian() {
        let reg = ClassicalRegister {
            name: "syndrome_register".into(),
            clbits: vec![ClbitId(3), ClbitId(4)],
        };
        let mut memory = vec![false; 5];
        memory[3] = true;
        assert_eq!(reg.value_in(&memory), 1);
        assert_eq!(reg.bitstring_in(&memory), "01");

        memory[4] = true;
        assert_eq!(reg.value_in(&memory), 3);
        assert_eq!(reg.bitstring_in(&memory), "11");
    }

    #[test]
    fn test_register_max_value() {
        let reg = ClassicalRegister {
            name: "r".into(),
            clbits: vec![ClbitId(0), ClbitId(1), ClbitId(2)],
        };
        assert_eq!(reg.max_value(), 7);

        let empty = ClassicalRegister {
            name: "e".into(),
            clbits: vec![],
        };
        assert_eq!(empty.max_value(), 0);
    }
}
