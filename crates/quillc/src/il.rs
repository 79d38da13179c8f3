//! CIL instruction emitter.
//!
//! [`MethodBody`] accumulates the opcode stream of one method and tracks the
//! evaluation stack while doing so. [`MethodHeader`] picks the tiny or fat
//! header encoding (ECMA-335 II.25.4) for the finished code.

use crate::bytes::ByteWriter;
use crate::constants::method::{
    FAT_FORMAT, FAT_HEADER_DWORDS, INIT_LOCALS, TINY_FORMAT, TINY_MAX_CODE_SIZE, TINY_MAX_STACK,
};
use crate::diagnostics::{InternalError, Result};

/// Single-byte CIL opcodes used by the emitter.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Opcode {
    Nop = 0x00,
    Ldnull = 0x14,
    LdcI4 = 0x20,
    Pop = 0x26,
    Call = 0x28,
    Ret = 0x2a,
    Ldstr = 0x72,
}

impl Opcode {
    pub fn mnemonic(self) -> &'static str {
        match self {
            Opcode::Nop => "nop",
            Opcode::Ldnull => "ldnull",
            Opcode::LdcI4 => "ldc.i4",
            Opcode::Pop => "pop",
            Opcode::Call => "call",
            Opcode::Ret => "ret",
            Opcode::Ldstr => "ldstr",
        }
    }
}

/// Opcode stream of one method plus evaluation stack bookkeeping.
#[derive(Debug, Clone, Default)]
pub struct MethodBody {
    code: ByteWriter,
    depth: u16,
    max_depth: u16,
}

impl MethodBody {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn code(&self) -> &[u8] {
        self.code.as_bytes()
    }

    pub fn code_size(&self) -> u32 {
        self.code.len() as u32
    }

    /// Current evaluation stack depth.
    pub fn depth(&self) -> u16 {
        self.depth
    }

    /// Deepest evaluation stack reached so far.
    pub fn max_depth(&self) -> u16 {
        self.max_depth
    }

    pub fn nop(&mut self) -> Result<()> {
        self.op(Opcode::Nop, 0, 0)
    }

    pub fn ldnull(&mut self) -> Result<()> {
        self.op(Opcode::Ldnull, 0, 1)
    }

    pub fn ldc_i4(&mut self, value: i32) -> Result<()> {
        self.op(Opcode::LdcI4, 0, 1)?;
        self.code.write_u32(value as u32);
        Ok(())
    }

    /// Loads a string literal given its `#US` token.
    pub fn ldstr(&mut self, token: u32) -> Result<()> {
        self.op(Opcode::Ldstr, 0, 1)?;
        self.code.write_u32(token);
        Ok(())
    }

    pub fn pop(&mut self) -> Result<()> {
        self.op(Opcode::Pop, 1, 0)
    }

    /// Calls a MethodDef or MemberRef token taking `args` stack arguments.
    pub fn call(&mut self, token: u32, args: u16, returns_value: bool) -> Result<()> {
        self.op(Opcode::Call, args, u16::from(returns_value))?;
        self.code.write_u32(token);
        Ok(())
    }

    pub fn ret(&mut self, returns_value: bool) -> Result<()> {
        self.op(Opcode::Ret, u16::from(returns_value), 0)
    }

    fn op(&mut self, opcode: Opcode, pops: u16, pushes: u16) -> Result<()> {
        if pops > self.depth {
            return Err(InternalError::StackUnderflow {
                opcode: opcode.mnemonic(),
                pops,
                depth: self.depth,
            });
        }
        self.depth = self.depth - pops + pushes;
        self.max_depth = self.max_depth.max(self.depth);
        self.code.write_u8(opcode as u8);
        Ok(())
    }

    /// Header followed by the code, ready to be placed at a method RVA.
    pub fn assemble(&self, header: &MethodHeader) -> Vec<u8> {
        let mut out = ByteWriter::new();
        header.write(&mut out);
        out.write_bytes(self.code());
        out.finish()
    }
}

/// Method body header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MethodHeader {
    pub flags: u16,
    pub max_stack: u16,
    pub code_size: u32,
    pub local_var_sig_tok: u32,
}

impl MethodHeader {
    /// Chooses the tiny format whenever the body allows it.
    pub fn new(code_size: u32, max_stack: u16, local_var_sig_tok: u32) -> Self {
        let tiny = code_size <= TINY_MAX_CODE_SIZE
            && max_stack <= TINY_MAX_STACK
            && local_var_sig_tok == 0;
        let flags = if tiny {
            u16::from(TINY_FORMAT)
        } else if local_var_sig_tok != 0 {
            (FAT_HEADER_DWORDS << 12) | FAT_FORMAT | INIT_LOCALS
        } else {
            (FAT_HEADER_DWORDS << 12) | FAT_FORMAT
        };
        Self {
            flags,
            max_stack,
            code_size,
            local_var_sig_tok,
        }
    }

    pub fn is_tiny(&self) -> bool {
        self.flags == u16::from(TINY_FORMAT)
    }

    /// Encoded size: 1 byte tiny, 12 bytes fat.
    pub fn size(&self) -> u32 {
        if self.is_tiny() {
            1
        } else {
            u32::from(FAT_HEADER_DWORDS) * 4
        }
    }

    pub fn write(&self, out: &mut ByteWriter) {
        if self.is_tiny() {
            out.write_u8(((self.code_size as u8) << 2) | TINY_FORMAT);
        } else {
            out.write_u16(self.flags);
            out.write_u16(self.max_stack);
            out.write_u32(self.code_size);
            out.write_u32(self.local_var_sig_tok);
        }
    }
}

/// Declared stack size of the generated entry point.
pub const ENTRY_POINT_MAX_STACK: u16 = 8;

/// The entry point body: print one string literal and return.
pub fn entry_point(greeting: u32, write_line: u32) -> Result<Vec<u8>> {
    let mut body = MethodBody::new();
    body.ldstr(greeting)?;
    body.call(write_line, 1, false)?;
    body.ret(false)?;
    log::trace!(
        "entry point: {} bytes of code, stack depth {}",
        body.code_size(),
        body.max_depth()
    );

    let header = MethodHeader::new(body.code_size(), ENTRY_POINT_MAX_STACK, 0);
    Ok(body.assemble(&header))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hex(bytes: &[u8]) -> String {
        bytes
            .iter()
            .map(|b| format!("{:02x}", b))
            .collect::<Vec<_>>()
            .join(" ")
    }

    #[test]
    fn entry_point_is_a_tiny_three_instruction_body() -> Result<()> {
        let bytes = entry_point(0x7000_0004, 0x0a00_0001)?;
        insta::assert_snapshot!(hex(&bytes), @"2e 72 04 00 00 70 28 01 00 00 0a 2a");
        Ok(())
    }

    #[test]
    fn entry_point_does_not_depend_on_anything_but_tokens() -> Result<()> {
        assert_eq!(
            entry_point(0x7000_0010, 0x0a00_0002)?,
            entry_point(0x7000_0010, 0x0a00_0002)?
        );
        Ok(())
    }

    #[test]
    fn stack_depth_is_tracked() -> Result<()> {
        let mut body = MethodBody::new();
        body.ldc_i4(1)?;
        body.ldnull()?;
        assert_eq!(body.depth(), 2);
        body.pop()?;
        body.pop()?;
        body.ret(false)?;
        assert_eq!(body.depth(), 0);
        assert_eq!(body.max_depth(), 2);
        assert_eq!(body.code(), &[0x20, 1, 0, 0, 0, 0x14, 0x26, 0x26, 0x2a]);
        Ok(())
    }

    #[test]
    fn popping_an_empty_stack_is_an_error() {
        let mut body = MethodBody::new();
        let err = body.call(0x0a00_0001, 1, false).unwrap_err();
        assert_eq!(
            err,
            InternalError::StackUnderflow {
                opcode: "call",
                pops: 1,
                depth: 0,
            }
        );
        assert!(body.code().is_empty());
    }

    #[test]
    fn large_bodies_use_the_fat_header() -> Result<()> {
        let mut body = MethodBody::new();
        for _ in 0..64 {
            body.nop()?;
        }
        body.ret(false)?;
        let header = MethodHeader::new(body.code_size(), 8, 0);
        assert!(!header.is_tiny());
        assert_eq!(header.size(), 12);

        let bytes = body.assemble(&header);
        assert_eq!(&bytes[..12], &[0x03, 0x30, 8, 0, 65, 0, 0, 0, 0, 0, 0, 0]);
        assert_eq!(bytes.len(), 12 + 65);
        Ok(())
    }

    #[test]
    fn locals_force_the_fat_header_with_init_locals() {
        let header = MethodHeader::new(4, 2, 0x1100_0001);
        assert_eq!(header.flags, 0x3013);
        assert!(!header.is_tiny());

        let header = MethodHeader::new(4, 9, 0);
        assert_eq!(header.flags, 0x3003);
    }
}
