use super::{Command, Opcode};

/// ## Block assembly and backpatching
///
/// A `Link` is a block of commands whose branch targets are still relative
/// to the block's own start. Blocks are built bottom-up: expression code,
/// condition code, statement code, construct code. Concatenation is the
/// only place offsets move: appending a block shifts its position-dependent
/// tags (`Dynamic`, `SkipOnce`) by the length of everything already ahead
/// of it. `Body` and `After` are position-independent placeholders owned by
/// the innermost enclosing loop/if construct and are resolved (retagged
/// `Dynamic`) exactly once, when that construct learns its final lengths.
///
/// Every condition block maintains one invariant: falling off its end
/// means the condition held. Explicit branches carry the placeholders.
#[derive(Debug, Default, PartialEq)]
pub struct Link {
    commands: Vec<Command>,
}

impl Link {
    pub fn new() -> Link {
        Link::default()
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn push(&mut self, command: Command) {
        self.commands.push(command);
    }

    /// Appends `block`, shifting its block-relative targets into this
    /// block's frame of reference.
    pub fn append(&mut self, block: Link) {
        let ahead = self.commands.len();
        for command in block.commands {
            self.commands.push(Link::shifted(command, ahead));
        }
    }

    fn shifted(command: Command, ahead: usize) -> Command {
        match command {
            Command::Dynamic(target) => Command::Dynamic(target + ahead),
            Command::SkipOnce(target) => Command::SkipOnce(target + ahead),
            other => other,
        }
    }

    pub fn commands(self) -> Vec<Command> {
        self.commands
    }

    pub fn as_slice(&self) -> &[Command] {
        &self.commands
    }

    pub fn is_resolved(&self) -> bool {
        self.commands.iter().all(|command| command.is_resolved())
    }

    /// A block ending in an unconditional jump never falls through, so
    /// there is no fall-through-true exit left to materialize.
    fn ends_in_jump(&self) -> bool {
        match self.commands.as_slice() {
            [.., Command::Op(Opcode::Jmp), _] => true,
            _ => false,
        }
    }

    /// `self && right`: the combined block tests `self` first. A true exit
    /// of `self` proceeds to `right` (retagged `SkipOnce` over `self`); a
    /// false exit already means the whole condition failed, so `After`
    /// stays. `right`'s exits keep their construct-level meaning.
    pub fn and(mut self, right: Link) -> Link {
        let left_len = self.len();
        for command in self.commands.iter_mut() {
            if let Command::Body = command {
                *command = Command::SkipOnce(left_len);
            }
        }
        self.append(right);
        self
    }

    /// `self || right`: a false exit of `self` proceeds to `right`; a true
    /// exit of either side means the whole condition held. `self`'s
    /// fall-through-true exit is first made explicit so it cannot fall
    /// into `right`, unless `self` already ends in an unconditional jump.
    pub fn or(mut self, right: Link) -> Link {
        if !self.ends_in_jump() {
            self.push(Command::Op(Opcode::Jmp));
            self.push(Command::Body);
        }
        let left_len = self.len();
        for command in self.commands.iter_mut() {
            if let Command::After = command {
                *command = Command::SkipOnce(left_len);
            }
        }
        self.append(right);
        self
    }

    /// `!self`: materialize the fall-through-true exit where one exists,
    /// then swap every `Body` and `After`. `SkipOnce` targets are internal
    /// control flow within the condition and keep their meaning.
    pub fn negate(mut self) -> Link {
        if !self.ends_in_jump() {
            self.push(Command::Op(Opcode::Jmp));
            self.push(Command::Body);
        }
        for command in self.commands.iter_mut() {
            match command {
                Command::Body => *command = Command::After,
                Command::After => *command = Command::Body,
                _ => {}
            }
        }
        self
    }

    /// Assembles `while (condition) body`: condition, body, and an
    /// unconditional branch back to the top, then resolves the condition's
    /// placeholders against the finished lengths. The exit target is the
    /// assembled length `C + B + 2`, i.e. the first command after the loop.
    pub fn looping(self, body: Link) -> Link {
        let condition_len = self.len();
        let mut block = self;
        block.append(body);
        block.push(Command::Op(Opcode::Jmp));
        block.push(Command::Dynamic(0));
        let after = block.len();
        block.resolve(condition_len, after)
    }

    /// Assembles `if (condition) then_body` with an optional else block.
    /// With an else, a false condition branches to the else block and the
    /// then block ends with a branch over it.
    pub fn branching(self, then_body: Link, else_body: Link) -> Link {
        let condition_len = self.len();
        let mut block = self;
        block.append(then_body);
        if else_body.is_empty() {
            let after = block.len();
            return block.resolve(condition_len, after);
        }
        let else_at = block.len() + 2;
        let after = else_at + else_body.len();
        block.push(Command::Op(Opcode::Jmp));
        block.push(Command::Dynamic(after));
        block.append(else_body);
        block.resolve(condition_len, else_at)
    }

    /// The single resolution pass: every remaining placeholder belongs to
    /// this construct's condition block, whose start coincides with the
    /// construct's start, so `SkipOnce` targets convert without shifting.
    fn resolve(mut self, body_at: usize, after_at: usize) -> Link {
        for command in self.commands.iter_mut() {
            match command {
                Command::Body => *command = Command::Dynamic(body_at),
                Command::After => *command = Command::Dynamic(after_at),
                Command::SkipOnce(target) => *command = Command::Dynamic(*target),
                _ => {}
            }
        }
        debug_assert!(self.is_resolved());
        self
    }
}
