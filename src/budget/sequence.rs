//! Immutable instruction sequences and compute-budget values
//!
//! A sequence is a persistent value: every builder method consumes `self`
//! and returns a new sequence, so two conditional branches can never share
//! and corrupt one mutable builder. Intermediate sequences (a "create"
//! group before an optional "mint" group is appended) stay independently
//! reusable.

use solana_sdk::{
    address_lookup_table::AddressLookupTableAccount,
    compute_budget::ComputeBudgetInstruction,
    instruction::Instruction,
    pubkey::Pubkey,
};

use crate::budget::errors::BudgetError;

/// Ledger cap on declared compute units per transaction
pub const MAX_COMPUTE_UNIT_LIMIT: u32 = 1_400_000;

/// Ordered instruction list plus signers and lookup tables
#[derive(Debug, Clone, Default)]
pub struct InstructionSequence {
    instructions: Vec<Instruction>,
    signers: Vec<Pubkey>,
    lookup_tables: Vec<AddressLookupTableAccount>,
}

impl InstructionSequence {
    pub fn new(instructions: Vec<Instruction>) -> Self {
        Self {
            instructions,
            signers: Vec::new(),
            lookup_tables: Vec::new(),
        }
    }

    /// Append one instruction, returning a new sequence
    pub fn add(mut self, instruction: Instruction) -> Self {
        self.instructions.push(instruction);
        self
    }

    /// Concatenate another sequence after this one
    ///
    /// Signers and lookup tables of the appended sequence are carried over.
    pub fn append(mut self, other: InstructionSequence) -> Self {
        self.instructions.extend(other.instructions);
        self.signers.extend(other.signers);
        self.lookup_tables.extend(other.lookup_tables);
        self
    }

    pub fn with_signer(mut self, signer: Pubkey) -> Self {
        self.signers.push(signer);
        self
    }

    pub fn with_lookup_table(mut self, table: AddressLookupTableAccount) -> Self {
        self.lookup_tables.push(table);
        self
    }

    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    pub fn signers(&self) -> &[Pubkey] {
        &self.signers
    }

    pub fn lookup_tables(&self) -> &[AddressLookupTableAccount] {
        &self.lookup_tables
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    pub fn len(&self) -> usize {
        self.instructions.len()
    }
}

/// The two directives injected ahead of every business instruction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComputeBudget {
    /// Priority fee in micro-lamports per compute unit
    pub price: u64,
    /// Declared compute-unit limit
    pub units: u32,
}

impl ComputeBudget {
    /// Render the budget as its two compute-budget program instructions,
    /// price first
    pub fn instructions(&self) -> [Instruction; 2] {
        [
            ComputeBudgetInstruction::set_compute_unit_price(self.price),
            ComputeBudgetInstruction::set_compute_unit_limit(self.units),
        ]
    }
}

/// Caller-supplied headroom multipliers for the raw estimate/simulation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaleFactors {
    pub price_scale: f64,
    pub limit_scale: f64,
}

impl Default for ScaleFactors {
    fn default() -> Self {
        Self {
            price_scale: 1.0,
            // Simulation is an estimate, not a guarantee; execution routinely
            // consumes marginally more units than simulation predicted.
            limit_scale: 1.1,
        }
    }
}

impl ScaleFactors {
    /// Factors below 1 would systematically under-provision
    pub fn validate(&self) -> Result<(), BudgetError> {
        if self.price_scale < 1.0 {
            return Err(BudgetError::InvalidScaleFactors(format!(
                "price_scale must be >= 1, got {}",
                self.price_scale
            )));
        }
        if self.limit_scale < 1.0 {
            return Err(BudgetError::InvalidScaleFactors(format!(
                "limit_scale must be >= 1, got {}",
                self.limit_scale
            )));
        }
        Ok(())
    }
}
