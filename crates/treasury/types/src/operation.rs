use serde::{Deserialize, Serialize};

/// Operations an account can delegate to an operator.
///
/// The index is the bit position of the operation in an operator's
/// permission word.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operation {
    Reconfigure,
    Redeem,
    MigrateController,
    MigrateTerminal,
    ProcessFees,
    SetMetadata,
    Issue,
    SetToken,
    Mint,
    Burn,
    Claim,
    Transfer,
    RequireClaim,
    SetController,
    SetTerminals,
    SetPrimaryTerminal,
    UseAllowance,
    SetSplits,
}

impl Operation {
    pub const ALL: [Operation; 18] = [
        Operation::Reconfigure,
        Operation::Redeem,
        Operation::MigrateController,
        Operation::MigrateTerminal,
        Operation::ProcessFees,
        Operation::SetMetadata,
        Operation::Issue,
        Operation::SetToken,
        Operation::Mint,
        Operation::Burn,
        Operation::Claim,
        Operation::Transfer,
        Operation::RequireClaim,
        Operation::SetController,
        Operation::SetTerminals,
        Operation::SetPrimaryTerminal,
        Operation::UseAllowance,
        Operation::SetSplits,
    ];

    pub fn index(&self) -> usize {
        match self {
            Operation::Reconfigure => 1,
            Operation::Redeem => 2,
            Operation::MigrateController => 3,
            Operation::MigrateTerminal => 4,
            Operation::ProcessFees => 5,
            Operation::SetMetadata => 6,
            Operation::Issue => 7,
            Operation::SetToken => 8,
            Operation::Mint => 9,
            Operation::Burn => 10,
            Operation::Claim => 11,
            Operation::Transfer => 12,
            Operation::RequireClaim => 13,
            Operation::SetController => 14,
            Operation::SetTerminals => 15,
            Operation::SetPrimaryTerminal => 16,
            Operation::UseAllowance => 17,
            Operation::SetSplits => 18,
        }
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn indexes_are_unique_and_nonzero() {
        let indexes: HashSet<usize> = Operation::ALL.iter().map(|op| op.index()).collect();
        assert_eq!(indexes.len(), Operation::ALL.len());
        assert!(!indexes.contains(&0));
        assert!(indexes.iter().all(|i| *i < 256));
    }

    #[test]
    fn controller_operations() {
        assert_eq!(Operation::Reconfigure.index(), 1);
        assert_eq!(Operation::MigrateController.index(), 3);
        assert_eq!(Operation::Mint.index(), 9);
        assert_eq!(Operation::Burn.index(), 10);
    }
}
