use std::fmt;

/// A named operator of the language.
///
/// Operator names are matched case-insensitively; [`Op::name`] is the
/// canonical upper-case spelling.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Op {
    Add,
    Subtract,
    Multiply,
    Divide,
    Remainder,
    Drop,
    DropN,
    Print,
    Swap,
    Rot,
    Roll,
    RollD,
    Pick,
    Depth,
    Dup,
    DupN,
    Show,
}

impl Op {
    pub const ALL: [Op; 17] = [
        Op::Add,
        Op::Subtract,
        Op::Multiply,
        Op::Divide,
        Op::Remainder,
        Op::Drop,
        Op::DropN,
        Op::Print,
        Op::Swap,
        Op::Rot,
        Op::Roll,
        Op::RollD,
        Op::Pick,
        Op::Depth,
        Op::Dup,
        Op::DupN,
        Op::Show,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Op::Add => "+",
            Op::Subtract => "-",
            Op::Multiply => "*",
            Op::Divide => "/",
            Op::Remainder => "%",
            Op::Drop => "DROP",
            Op::DropN => "DROPN",
            Op::Print => "PRINT",
            Op::Swap => "SWAP",
            Op::Rot => "ROT",
            Op::Roll => "ROLL",
            Op::RollD => "ROLLD",
            Op::Pick => "PICK",
            Op::Depth => "DEPTH",
            Op::Dup => "DUP",
            Op::DupN => "DUPN",
            Op::Show => "SHOW",
        }
    }

    /// Looks up an operator by name, ignoring ASCII case.
    pub fn by_name(name: &str) -> Option<Op> {
        let upper = name.to_ascii_uppercase();
        Op::ALL.iter().copied().find(|op| op.name() == upper)
    }
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
