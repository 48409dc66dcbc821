//! Types for representing branches, branch outcomes, and trace records.

/// A branch outcome.
#[repr(u32)]
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Outcome {
    /// Not taken
    N = 0,
    /// Taken
    T = 1
}

impl Outcome {
    /// The training direction for this outcome (+1 when taken, -1 otherwise).
    pub fn sign(self) -> i32 {
        match self {
            Self::T => 1,
            Self::N => -1,
        }
    }

    pub fn is_taken(self) -> bool { matches!(self, Self::T) }
}

impl std::fmt::Debug for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let s = match self {
            Self::T => "t",
            Self::N => "n",
        };
        write!(f, "{}", s)
    }
}

impl std::ops::Not for Outcome {
    type Output = Self;
    fn not(self) -> Self {
        match self {
            Self::N => Self::T,
            Self::T => Self::N,
        }
    }
}

impl From<bool> for Outcome {
    fn from(x: bool) -> Self {
        match x {
            true => Self::T,
            false => Self::N
        }
    }
}
impl From<Outcome> for bool {
    fn from(x: Outcome) -> Self {
        x.is_taken()
    }
}

/// The major opcode occupies the 7 least-significant bits of an instruction.
pub const OPCODE_MASK: u32 = 0b111_1111;

/// Conditional branch instructions (BEQ, BNE, BLT, BGE, BLTU, BGEU).
pub const OP_BRANCH: u32 = 0b110_0011;

/// Control-flow class of a RISC-V instruction word.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum InstClass {
    /// A B-type conditional branch.
    Branch,
    /// Anything else.
    Other,
}
impl InstClass {
    /// Classify an instruction word by its major opcode.
    pub fn of(inst: u32) -> Self {
        match inst & OPCODE_MASK {
            OP_BRANCH => Self::Branch,
            _ => Self::Other,
        }
    }

    /// Returns 'true' for conditional branches.
    pub fn is_conditional(self) -> bool { matches!(self, Self::Branch) }
}

/// A committed instruction taken from a trace.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TraceRecord {
    /// The program counter value for this instruction
    pub pc: u32,

    /// The raw instruction encoding
    pub inst: u32,
}
impl TraceRecord {
    pub fn new(pc: u32, inst: u32) -> Self {
        Self { pc, inst }
    }

    pub fn class(&self) -> InstClass { InstClass::of(self.inst) }

    /// Returns 'true' if this is a conditional branch instruction.
    pub fn is_conditional(&self) -> bool { self.class().is_conditional() }

    /// The address of the sequentially-next instruction.
    pub fn fallthrough(&self) -> u32 { self.pc.wrapping_add(4) }

    /// Infer the outcome of this instruction from the record committed
    /// after it: any successor other than the fall-through is 'taken'.
    pub fn outcome_given(&self, next: &TraceRecord) -> Outcome {
        Outcome::from(next.pc != self.fallthrough())
    }
}
