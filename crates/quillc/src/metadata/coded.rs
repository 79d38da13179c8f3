//! Coded indexes (ECMA-335 II.24.2.6).
//!
//! A coded index references a row in one of several candidate tables. The
//! candidate is selected by a tag stored in the low bits; the 1-based row
//! index is shifted above it. Each kind has its own fixed tag width and tag
//! assignment, which a loader decodes exactly as written here.

use super::tables::TableId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CodedIndexKind {
    TypeDefOrRef,
    HasConstant,
    HasCustomAttribute,
    HasFieldMarshal,
    HasDeclSecurity,
    MemberRefParent,
    HasSemantics,
    MethodDefOrRef,
    MemberForwarded,
    Implementation,
    CustomAttributeType,
    ResolutionScope,
    TypeOrMethodDef,
}

impl CodedIndexKind {
    pub fn tag_bits(self) -> u32 {
        match self {
            CodedIndexKind::HasFieldMarshal
            | CodedIndexKind::HasSemantics
            | CodedIndexKind::MethodDefOrRef
            | CodedIndexKind::MemberForwarded
            | CodedIndexKind::TypeOrMethodDef => 1,
            CodedIndexKind::TypeDefOrRef
            | CodedIndexKind::HasConstant
            | CodedIndexKind::HasDeclSecurity
            | CodedIndexKind::Implementation
            | CodedIndexKind::ResolutionScope => 2,
            CodedIndexKind::MemberRefParent | CodedIndexKind::CustomAttributeType => 3,
            CodedIndexKind::HasCustomAttribute => 5,
        }
    }

    /// Candidate tables indexed by tag; `None` marks an unused tag.
    pub fn tables(self) -> &'static [Option<TableId>] {
        use TableId::*;
        match self {
            CodedIndexKind::TypeDefOrRef => &[Some(TypeDef), Some(TypeRef), Some(TypeSpec)],
            CodedIndexKind::HasConstant => &[Some(Field), Some(Param), Some(Property)],
            CodedIndexKind::HasCustomAttribute => &[
                Some(MethodDef),
                Some(Field),
                Some(TypeRef),
                Some(TypeDef),
                Some(Param),
                Some(InterfaceImpl),
                Some(MemberRef),
                Some(Module),
                Some(DeclSecurity),
                Some(Property),
                Some(Event),
                Some(StandAloneSig),
                Some(ModuleRef),
                Some(TypeSpec),
                Some(Assembly),
                Some(AssemblyRef),
                Some(File),
                Some(ExportedType),
                Some(ManifestResource),
                Some(GenericParam),
                Some(GenericParamConstraint),
                Some(MethodSpec),
            ],
            CodedIndexKind::HasFieldMarshal => &[Some(Field), Some(Param)],
            CodedIndexKind::HasDeclSecurity => &[Some(TypeDef), Some(MethodDef), Some(Assembly)],
            CodedIndexKind::MemberRefParent => &[
                Some(TypeRef),
                Some(TypeDef),
                Some(ModuleRef),
                Some(MethodDef),
                Some(TypeSpec),
            ],
            CodedIndexKind::HasSemantics => &[Some(Event), Some(Property)],
            CodedIndexKind::MethodDefOrRef => &[Some(MethodDef), Some(MemberRef)],
            CodedIndexKind::MemberForwarded => &[Some(Field), Some(MethodDef)],
            CodedIndexKind::Implementation => &[Some(File), Some(AssemblyRef), Some(ExportedType)],
            CodedIndexKind::CustomAttributeType => {
                &[None, None, Some(MethodDef), Some(MemberRef), None]
            }
            CodedIndexKind::ResolutionScope => {
                &[Some(Module), Some(ModuleRef), Some(AssemblyRef), Some(TypeRef)]
            }
            CodedIndexKind::TypeOrMethodDef => &[Some(TypeDef), Some(MethodDef)],
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            CodedIndexKind::TypeDefOrRef => "TypeDefOrRef",
            CodedIndexKind::HasConstant => "HasConstant",
            CodedIndexKind::HasCustomAttribute => "HasCustomAttribute",
            CodedIndexKind::HasFieldMarshal => "HasFieldMarshal",
            CodedIndexKind::HasDeclSecurity => "HasDeclSecurity",
            CodedIndexKind::MemberRefParent => "MemberRefParent",
            CodedIndexKind::HasSemantics => "HasSemantics",
            CodedIndexKind::MethodDefOrRef => "MethodDefOrRef",
            CodedIndexKind::MemberForwarded => "MemberForwarded",
            CodedIndexKind::Implementation => "Implementation",
            CodedIndexKind::CustomAttributeType => "CustomAttributeType",
            CodedIndexKind::ResolutionScope => "ResolutionScope",
            CodedIndexKind::TypeOrMethodDef => "TypeOrMethodDef",
        }
    }

    /// Splits an encoded value into the tagged table and the row index.
    pub fn decode(self, value: u32) -> Option<(TableId, u32)> {
        let bits = self.tag_bits();
        let tag = value & ((1 << bits) - 1);
        let table = self.tables().get(tag as usize).copied().flatten()?;
        Some((table, value >> bits))
    }
}

/// A typed coded index. Implemented by one enum per [`CodedIndexKind`].
pub trait CodedIndex: Copy {
    const KIND: CodedIndexKind;

    /// Target table and 1-based row.
    fn target(self) -> (TableId, u32);

    /// Rebuilds the index from a target; `None` if the table is not a candidate.
    fn from_target(table: TableId, row: u32) -> Option<Self>;

    /// Row shifted above the tag; `None` if the target table has no tag in
    /// this kind.
    fn encode(self) -> Option<u32> {
        let (table, row) = self.target();
        let tag = Self::KIND
            .tables()
            .iter()
            .position(|candidate| *candidate == Some(table))? as u32;
        Some((row << Self::KIND.tag_bits()) | tag)
    }

    fn decode(value: u32) -> Option<Self> {
        let (table, row) = Self::KIND.decode(value)?;
        Self::from_target(table, row)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionScope {
    Module(u32),
    ModuleRef(u32),
    AssemblyRef(u32),
    TypeRef(u32),
}

impl CodedIndex for ResolutionScope {
    const KIND: CodedIndexKind = CodedIndexKind::ResolutionScope;

    fn target(self) -> (TableId, u32) {
        match self {
            ResolutionScope::Module(row) => (TableId::Module, row),
            ResolutionScope::ModuleRef(row) => (TableId::ModuleRef, row),
            ResolutionScope::AssemblyRef(row) => (TableId::AssemblyRef, row),
            ResolutionScope::TypeRef(row) => (TableId::TypeRef, row),
        }
    }

    fn from_target(table: TableId, row: u32) -> Option<Self> {
        match table {
            TableId::Module => Some(ResolutionScope::Module(row)),
            TableId::ModuleRef => Some(ResolutionScope::ModuleRef(row)),
            TableId::AssemblyRef => Some(ResolutionScope::AssemblyRef(row)),
            TableId::TypeRef => Some(ResolutionScope::TypeRef(row)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberRefParent {
    TypeRef(u32),
    TypeDef(u32),
    ModuleRef(u32),
    MethodDef(u32),
    TypeSpec(u32),
}

impl CodedIndex for MemberRefParent {
    const KIND: CodedIndexKind = CodedIndexKind::MemberRefParent;

    fn target(self) -> (TableId, u32) {
        match self {
            MemberRefParent::TypeRef(row) => (TableId::TypeRef, row),
            MemberRefParent::TypeDef(row) => (TableId::TypeDef, row),
            MemberRefParent::ModuleRef(row) => (TableId::ModuleRef, row),
            MemberRefParent::MethodDef(row) => (TableId::MethodDef, row),
            MemberRefParent::TypeSpec(row) => (TableId::TypeSpec, row),
        }
    }

    fn from_target(table: TableId, row: u32) -> Option<Self> {
        match table {
            TableId::TypeRef => Some(MemberRefParent::TypeRef(row)),
            TableId::TypeDef => Some(MemberRefParent::TypeDef(row)),
            TableId::ModuleRef => Some(MemberRefParent::ModuleRef(row)),
            TableId::MethodDef => Some(MemberRefParent::MethodDef(row)),
            TableId::TypeSpec => Some(MemberRefParent::TypeSpec(row)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeDefOrRef {
    TypeDef(u32),
    TypeRef(u32),
    TypeSpec(u32),
}

impl CodedIndex for TypeDefOrRef {
    const KIND: CodedIndexKind = CodedIndexKind::TypeDefOrRef;

    fn target(self) -> (TableId, u32) {
        match self {
            TypeDefOrRef::TypeDef(row) => (TableId::TypeDef, row),
            TypeDefOrRef::TypeRef(row) => (TableId::TypeRef, row),
            TypeDefOrRef::TypeSpec(row) => (TableId::TypeSpec, row),
        }
    }

    fn from_target(table: TableId, row: u32) -> Option<Self> {
        match table {
            TableId::TypeDef => Some(TypeDefOrRef::TypeDef(row)),
            TableId::TypeRef => Some(TypeDefOrRef::TypeRef(row)),
            TableId::TypeSpec => Some(TypeDefOrRef::TypeSpec(row)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HasConstant {
    Field(u32),
    Param(u32),
    Property(u32),
}

impl CodedIndex for HasConstant {
    const KIND: CodedIndexKind = CodedIndexKind::HasConstant;

    fn target(self) -> (TableId, u32) {
        match self {
            HasConstant::Field(row) => (TableId::Field, row),
            HasConstant::Param(row) => (TableId::Param, row),
            HasConstant::Property(row) => (TableId::Property, row),
        }
    }

    fn from_target(table: TableId, row: u32) -> Option<Self> {
        match table {
            TableId::Field => Some(HasConstant::Field(row)),
            TableId::Param => Some(HasConstant::Param(row)),
            TableId::Property => Some(HasConstant::Property(row)),
            _ => None,
        }
    }
}

/// Any row that can carry a custom attribute. The target table is stored
/// explicitly because 22 tables qualify.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HasCustomAttribute {
    table: TableId,
    row: u32,
}

impl HasCustomAttribute {
    pub fn new(table: TableId, row: u32) -> Option<Self> {
        Self::from_target(table, row)
    }

    pub fn table(self) -> TableId {
        self.table
    }

    pub fn row(self) -> u32 {
        self.row
    }
}

impl CodedIndex for HasCustomAttribute {
    const KIND: CodedIndexKind = CodedIndexKind::HasCustomAttribute;

    fn target(self) -> (TableId, u32) {
        (self.table, self.row)
    }

    fn from_target(table: TableId, row: u32) -> Option<Self> {
        Self::KIND
            .tables()
            .contains(&Some(table))
            .then_some(HasCustomAttribute { table, row })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HasFieldMarshal {
    Field(u32),
    Param(u32),
}

impl CodedIndex for HasFieldMarshal {
    const KIND: CodedIndexKind = CodedIndexKind::HasFieldMarshal;

    fn target(self) -> (TableId, u32) {
        match self {
            HasFieldMarshal::Field(row) => (TableId::Field, row),
            HasFieldMarshal::Param(row) => (TableId::Param, row),
        }
    }

    fn from_target(table: TableId, row: u32) -> Option<Self> {
        match table {
            TableId::Field => Some(HasFieldMarshal::Field(row)),
            TableId::Param => Some(HasFieldMarshal::Param(row)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HasDeclSecurity {
    TypeDef(u32),
    MethodDef(u32),
    Assembly(u32),
}

impl CodedIndex for HasDeclSecurity {
    const KIND: CodedIndexKind = CodedIndexKind::HasDeclSecurity;

    fn target(self) -> (TableId, u32) {
        match self {
            HasDeclSecurity::TypeDef(row) => (TableId::TypeDef, row),
            HasDeclSecurity::MethodDef(row) => (TableId::MethodDef, row),
            HasDeclSecurity::Assembly(row) => (TableId::Assembly, row),
        }
    }

    fn from_target(table: TableId, row: u32) -> Option<Self> {
        match table {
            TableId::TypeDef => Some(HasDeclSecurity::TypeDef(row)),
            TableId::MethodDef => Some(HasDeclSecurity::MethodDef(row)),
            TableId::Assembly => Some(HasDeclSecurity::Assembly(row)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HasSemantics {
    Event(u32),
    Property(u32),
}

impl CodedIndex for HasSemantics {
    const KIND: CodedIndexKind = CodedIndexKind::HasSemantics;

    fn target(self) -> (TableId, u32) {
        match self {
            HasSemantics::Event(row) => (TableId::Event, row),
            HasSemantics::Property(row) => (TableId::Property, row),
        }
    }

    fn from_target(table: TableId, row: u32) -> Option<Self> {
        match table {
            TableId::Event => Some(HasSemantics::Event(row)),
            TableId::Property => Some(HasSemantics::Property(row)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MethodDefOrRef {
    MethodDef(u32),
    MemberRef(u32),
}

impl CodedIndex for MethodDefOrRef {
    const KIND: CodedIndexKind = CodedIndexKind::MethodDefOrRef;

    fn target(self) -> (TableId, u32) {
        match self {
            MethodDefOrRef::MethodDef(row) => (TableId::MethodDef, row),
            MethodDefOrRef::MemberRef(row) => (TableId::MemberRef, row),
        }
    }

    fn from_target(table: TableId, row: u32) -> Option<Self> {
        match table {
            TableId::MethodDef => Some(MethodDefOrRef::MethodDef(row)),
            TableId::MemberRef => Some(MethodDefOrRef::MemberRef(row)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberForwarded {
    Field(u32),
    MethodDef(u32),
}

impl CodedIndex for MemberForwarded {
    const KIND: CodedIndexKind = CodedIndexKind::MemberForwarded;

    fn target(self) -> (TableId, u32) {
        match self {
            MemberForwarded::Field(row) => (TableId::Field, row),
            MemberForwarded::MethodDef(row) => (TableId::MethodDef, row),
        }
    }

    fn from_target(table: TableId, row: u32) -> Option<Self> {
        match table {
            TableId::Field => Some(MemberForwarded::Field(row)),
            TableId::MethodDef => Some(MemberForwarded::MethodDef(row)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Implementation {
    File(u32),
    AssemblyRef(u32),
    ExportedType(u32),
}

impl CodedIndex for Implementation {
    const KIND: CodedIndexKind = CodedIndexKind::Implementation;

    fn target(self) -> (TableId, u32) {
        match self {
            Implementation::File(row) => (TableId::File, row),
            Implementation::AssemblyRef(row) => (TableId::AssemblyRef, row),
            Implementation::ExportedType(row) => (TableId::ExportedType, row),
        }
    }

    fn from_target(table: TableId, row: u32) -> Option<Self> {
        match table {
            TableId::File => Some(Implementation::File(row)),
            TableId::AssemblyRef => Some(Implementation::AssemblyRef(row)),
            TableId::ExportedType => Some(Implementation::ExportedType(row)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CustomAttributeType {
    MethodDef(u32),
    MemberRef(u32),
}

impl CodedIndex for CustomAttributeType {
    const KIND: CodedIndexKind = CodedIndexKind::CustomAttributeType;

    fn target(self) -> (TableId, u32) {
        match self {
            CustomAttributeType::MethodDef(row) => (TableId::MethodDef, row),
            CustomAttributeType::MemberRef(row) => (TableId::MemberRef, row),
        }
    }

    fn from_target(table: TableId, row: u32) -> Option<Self> {
        match table {
            TableId::MethodDef => Some(CustomAttributeType::MethodDef(row)),
            TableId::MemberRef => Some(CustomAttributeType::MemberRef(row)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeOrMethodDef {
    TypeDef(u32),
    MethodDef(u32),
}

impl CodedIndex for TypeOrMethodDef {
    const KIND: CodedIndexKind = CodedIndexKind::TypeOrMethodDef;

    fn target(self) -> (TableId, u32) {
        match self {
            TypeOrMethodDef::TypeDef(row) => (TableId::TypeDef, row),
            TypeOrMethodDef::MethodDef(row) => (TableId::MethodDef, row),
        }
    }

    fn from_target(table: TableId, row: u32) -> Option<Self> {
        match table {
            TableId::TypeDef => Some(TypeOrMethodDef::TypeDef(row)),
            TableId::MethodDef => Some(TypeOrMethodDef::MethodDef(row)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolution_scope_assembly_ref_is_tagged_two() {
        for i in [1u32, 2, 7, 0x3fff] {
            let value = ResolutionScope::AssemblyRef(i).encode().unwrap();
            assert_eq!(value & 0b11, 2);
            assert_eq!(value, (i << 2) | 2);
            assert_eq!(ResolutionScope::decode(value), Some(ResolutionScope::AssemblyRef(i)));
        }
    }

    #[test]
    fn member_ref_parent_type_ref_is_tagged_zero() {
        for i in [1u32, 3, 100, 0x1fff] {
            let value = MemberRefParent::TypeRef(i).encode().unwrap();
            assert_eq!(value & 0b111, 0);
            assert_eq!(value, i << 3);
            assert_eq!(MemberRefParent::decode(value), Some(MemberRefParent::TypeRef(i)));
        }
    }

    #[test]
    fn unused_tags_do_not_decode() {
        assert_eq!(CustomAttributeType::decode((5 << 3) | 1), None);
        assert_eq!(MemberRefParent::decode((5 << 3) | 6), None);
        assert_eq!(
            CustomAttributeType::decode((5 << 3) | 3),
            Some(CustomAttributeType::MemberRef(5))
        );
    }

    #[test]
    fn has_custom_attribute_uses_five_tag_bits() {
        let value = HasCustomAttribute { table: TableId::Assembly, row: 1 }
            .encode()
            .unwrap();
        assert_eq!(value, (1 << 5) | 14);
        assert_eq!(
            HasCustomAttribute::decode(value),
            HasCustomAttribute::new(TableId::Assembly, 1)
        );
        assert!(HasCustomAttribute::new(TableId::ClassLayout, 1).is_none());
    }

    #[test]
    fn untagged_target_is_rejected_when_written() {
        use crate::diagnostics::InternalError;
        use crate::metadata::rows::{ClassLayout, CustomAttribute, MemberRef, TypeDef};
        use crate::metadata::tables::{HeapSizes, Tables};

        let mut tables = Tables::default();
        tables.type_def.push(TypeDef {
            flags: 0,
            name: 0,
            namespace: 0,
            extends: None,
            field_list: 1,
            method_list: 1,
        });
        tables.class_layout.push(ClassLayout {
            packing_size: 0,
            class_size: 0,
            parent: 1,
        });
        tables.member_ref.push(MemberRef {
            class: MemberRefParent::TypeDef(1),
            name: 0,
            signature: 0,
        });
        tables.custom_attribute.push(CustomAttribute {
            parent: HasCustomAttribute { table: TableId::ClassLayout, row: 1 },
            ty: CustomAttributeType::MemberRef(1),
            value: 0,
        });

        assert_eq!(
            HasCustomAttribute { table: TableId::ClassLayout, row: 1 }.encode(),
            None
        );
        let err = tables
            .serialize(HeapSizes { strings: 4, blobs: 4, guids: 0 })
            .unwrap_err();
        assert_eq!(
            err,
            InternalError::InvalidCodedIndex {
                table: "CustomAttribute",
                row: 1,
                column: "Parent",
                kind: "HasCustomAttribute",
                target: "ClassLayout",
            }
        );
    }

    #[test]
    fn tag_counts_fit_their_widths() {
        let kinds = [
            CodedIndexKind::TypeDefOrRef,
            CodedIndexKind::HasConstant,
            CodedIndexKind::HasCustomAttribute,
            CodedIndexKind::HasFieldMarshal,
            CodedIndexKind::HasDeclSecurity,
            CodedIndexKind::MemberRefParent,
            CodedIndexKind::HasSemantics,
            CodedIndexKind::MethodDefOrRef,
            CodedIndexKind::MemberForwarded,
            CodedIndexKind::Implementation,
            CodedIndexKind::CustomAttributeType,
            CodedIndexKind::ResolutionScope,
            CodedIndexKind::TypeOrMethodDef,
        ];
        for kind in kinds {
            assert!(kind.tables().len() <= 1 << kind.tag_bits(), "{}", kind.name());
        }
    }
}
