//! Row layouts of the ECMA-335 metadata tables (partition II, chapter 22).
//!
//! Heap columns hold byte offsets into `#Strings` / `#Blob`, or a 1-based
//! index into `#GUID`. Table columns hold 1-based row indexes or coded
//! indexes. Column names passed to the writer are the ECMA names, so a
//! validation error reads the same as the standard.

use super::coded::*;
use super::tables::{Row, RowWriter, TableId};
use crate::diagnostics::Result;

#[derive(Debug, Clone, Default)]
pub struct Module {
    pub generation: u16,
    pub name: u32,
    pub mvid: u32,
    pub enc_id: u32,
    pub enc_base_id: u32,
}

impl Row for Module {
    const TABLE: TableId = TableId::Module;

    fn write(&self, w: &mut RowWriter<'_>) -> Result<()> {
        w.u16(self.generation);
        w.string("Name", self.name)?;
        w.guid("Mvid", self.mvid)?;
        w.guid("EncId", self.enc_id)?;
        w.guid("EncBaseId", self.enc_base_id)
    }
}

#[derive(Debug, Clone)]
pub struct TypeRef {
    pub resolution_scope: ResolutionScope,
    pub name: u32,
    pub namespace: u32,
}

impl Row for TypeRef {
    const TABLE: TableId = TableId::TypeRef;

    fn write(&self, w: &mut RowWriter<'_>) -> Result<()> {
        w.coded("ResolutionScope", self.resolution_scope)?;
        w.string("TypeName", self.name)?;
        w.string("TypeNamespace", self.namespace)
    }
}

#[derive(Debug, Clone)]
pub struct TypeDef {
    pub flags: u32,
    pub name: u32,
    pub namespace: u32,
    /// Base type; `None` for `<Module>` and interfaces.
    pub extends: Option<TypeDefOrRef>,
    pub field_list: u32,
    pub method_list: u32,
}

impl Row for TypeDef {
    const TABLE: TableId = TableId::TypeDef;

    fn write(&self, w: &mut RowWriter<'_>) -> Result<()> {
        w.u32(self.flags);
        w.string("TypeName", self.name)?;
        w.string("TypeNamespace", self.namespace)?;
        w.optional_coded("Extends", self.extends)?;
        w.list("FieldList", TableId::Field, self.field_list)?;
        w.list("MethodList", TableId::MethodDef, self.method_list)
    }
}

#[derive(Debug, Clone)]
pub struct Field {
    pub flags: u16,
    pub name: u32,
    pub signature: u32,
}

impl Row for Field {
    const TABLE: TableId = TableId::Field;

    fn write(&self, w: &mut RowWriter<'_>) -> Result<()> {
        w.u16(self.flags);
        w.string("Name", self.name)?;
        w.blob("Signature", self.signature)
    }
}

#[derive(Debug, Clone)]
pub struct MethodDef {
    /// Method body RVA, known once the body is placed in the image.
    pub rva: Option<u32>,
    pub impl_flags: u16,
    pub flags: u16,
    pub name: u32,
    pub signature: u32,
    pub param_list: u32,
}

impl Row for MethodDef {
    const TABLE: TableId = TableId::MethodDef;

    fn write(&self, w: &mut RowWriter<'_>) -> Result<()> {
        let rva = w.late_bound("RVA", self.rva)?;
        w.u32(rva);
        w.u16(self.impl_flags);
        w.u16(self.flags);
        w.string("Name", self.name)?;
        w.blob("Signature", self.signature)?;
        w.list("ParamList", TableId::Param, self.param_list)
    }
}

#[derive(Debug, Clone)]
pub struct Param {
    pub flags: u16,
    pub sequence: u16,
    pub name: u32,
}

impl Row for Param {
    const TABLE: TableId = TableId::Param;

    fn write(&self, w: &mut RowWriter<'_>) -> Result<()> {
        w.u16(self.flags);
        w.u16(self.sequence);
        w.string("Name", self.name)
    }
}

#[derive(Debug, Clone)]
pub struct InterfaceImpl {
    pub class: u32,
    pub interface: TypeDefOrRef,
}

impl Row for InterfaceImpl {
    const TABLE: TableId = TableId::InterfaceImpl;

    fn write(&self, w: &mut RowWriter<'_>) -> Result<()> {
        w.index("Class", TableId::TypeDef, self.class)?;
        w.coded("Interface", self.interface)
    }
}

#[derive(Debug, Clone)]
pub struct MemberRef {
    pub class: MemberRefParent,
    pub name: u32,
    pub signature: u32,
}

impl Row for MemberRef {
    const TABLE: TableId = TableId::MemberRef;

    fn write(&self, w: &mut RowWriter<'_>) -> Result<()> {
        w.coded("Class", self.class)?;
        w.string("Name", self.name)?;
        w.blob("Signature", self.signature)
    }
}

#[derive(Debug, Clone)]
pub struct Constant {
    /// ELEMENT_TYPE of the value; followed by a zero padding byte.
    pub ty: u8,
    pub parent: HasConstant,
    pub value: u32,
}

impl Row for Constant {
    const TABLE: TableId = TableId::Constant;

    fn write(&self, w: &mut RowWriter<'_>) -> Result<()> {
        w.u8(self.ty);
        w.u8(0);
        w.coded("Parent", self.parent)?;
        w.blob("Value", self.value)
    }
}

#[derive(Debug, Clone)]
pub struct CustomAttribute {
    pub parent: HasCustomAttribute,
    pub ty: CustomAttributeType,
    pub value: u32,
}

impl Row for CustomAttribute {
    const TABLE: TableId = TableId::CustomAttribute;

    fn write(&self, w: &mut RowWriter<'_>) -> Result<()> {
        w.coded("Parent", self.parent)?;
        w.coded("Type", self.ty)?;
        w.blob("Value", self.value)
    }
}

#[derive(Debug, Clone)]
pub struct FieldMarshal {
    pub parent: HasFieldMarshal,
    pub native_type: u32,
}

impl Row for FieldMarshal {
    const TABLE: TableId = TableId::FieldMarshal;

    fn write(&self, w: &mut RowWriter<'_>) -> Result<()> {
        w.coded("Parent", self.parent)?;
        w.blob("NativeType", self.native_type)
    }
}

#[derive(Debug, Clone)]
pub struct DeclSecurity {
    pub action: u16,
    pub parent: HasDeclSecurity,
    pub permission_set: u32,
}

impl Row for DeclSecurity {
    const TABLE: TableId = TableId::DeclSecurity;

    fn write(&self, w: &mut RowWriter<'_>) -> Result<()> {
        w.u16(self.action);
        w.coded("Parent", self.parent)?;
        w.blob("PermissionSet", self.permission_set)
    }
}

#[derive(Debug, Clone)]
pub struct ClassLayout {
    pub packing_size: u16,
    pub class_size: u32,
    pub parent: u32,
}

impl Row for ClassLayout {
    const TABLE: TableId = TableId::ClassLayout;

    fn write(&self, w: &mut RowWriter<'_>) -> Result<()> {
        w.u16(self.packing_size);
        w.u32(self.class_size);
        w.index("Parent", TableId::TypeDef, self.parent)
    }
}

#[derive(Debug, Clone)]
pub struct FieldLayout {
    pub offset: u32,
    pub field: u32,
}

impl Row for FieldLayout {
    const TABLE: TableId = TableId::FieldLayout;

    fn write(&self, w: &mut RowWriter<'_>) -> Result<()> {
        w.u32(self.offset);
        w.index("Field", TableId::Field, self.field)
    }
}

#[derive(Debug, Clone)]
pub struct StandAloneSig {
    pub signature: u32,
}

impl Row for StandAloneSig {
    const TABLE: TableId = TableId::StandAloneSig;

    fn write(&self, w: &mut RowWriter<'_>) -> Result<()> {
        w.blob("Signature", self.signature)
    }
}

#[derive(Debug, Clone)]
pub struct EventMap {
    pub parent: u32,
    pub event_list: u32,
}

impl Row for EventMap {
    const TABLE: TableId = TableId::EventMap;

    fn write(&self, w: &mut RowWriter<'_>) -> Result<()> {
        w.index("Parent", TableId::TypeDef, self.parent)?;
        w.list("EventList", TableId::Event, self.event_list)
    }
}

#[derive(Debug, Clone)]
pub struct Event {
    pub flags: u16,
    pub name: u32,
    pub event_type: TypeDefOrRef,
}

impl Row for Event {
    const TABLE: TableId = TableId::Event;

    fn write(&self, w: &mut RowWriter<'_>) -> Result<()> {
        w.u16(self.flags);
        w.string("Name", self.name)?;
        w.coded("EventType", self.event_type)
    }
}

#[derive(Debug, Clone)]
pub struct PropertyMap {
    pub parent: u32,
    pub property_list: u32,
}

impl Row for PropertyMap {
    const TABLE: TableId = TableId::PropertyMap;

    fn write(&self, w: &mut RowWriter<'_>) -> Result<()> {
        w.index("Parent", TableId::TypeDef, self.parent)?;
        w.list("PropertyList", TableId::Property, self.property_list)
    }
}

#[derive(Debug, Clone)]
pub struct Property {
    pub flags: u16,
    pub name: u32,
    pub ty: u32,
}

impl Row for Property {
    const TABLE: TableId = TableId::Property;

    fn write(&self, w: &mut RowWriter<'_>) -> Result<()> {
        w.u16(self.flags);
        w.string("Name", self.name)?;
        w.blob("Type", self.ty)
    }
}

#[derive(Debug, Clone)]
pub struct MethodSemantics {
    pub semantics: u16,
    pub method: u32,
    pub association: HasSemantics,
}

impl Row for MethodSemantics {
    const TABLE: TableId = TableId::MethodSemantics;

    fn write(&self, w: &mut RowWriter<'_>) -> Result<()> {
        w.u16(self.semantics);
        w.index("Method", TableId::MethodDef, self.method)?;
        w.coded("Association", self.association)
    }
}

#[derive(Debug, Clone)]
pub struct MethodImpl {
    pub class: u32,
    pub method_body: MethodDefOrRef,
    pub method_declaration: MethodDefOrRef,
}

impl Row for MethodImpl {
    const TABLE: TableId = TableId::MethodImpl;

    fn write(&self, w: &mut RowWriter<'_>) -> Result<()> {
        w.index("Class", TableId::TypeDef, self.class)?;
        w.coded("MethodBody", self.method_body)?;
        w.coded("MethodDeclaration", self.method_declaration)
    }
}

#[derive(Debug, Clone)]
pub struct ModuleRef {
    pub name: u32,
}

impl Row for ModuleRef {
    const TABLE: TableId = TableId::ModuleRef;

    fn write(&self, w: &mut RowWriter<'_>) -> Result<()> {
        w.string("Name", self.name)
    }
}

#[derive(Debug, Clone)]
pub struct TypeSpec {
    pub signature: u32,
}

impl Row for TypeSpec {
    const TABLE: TableId = TableId::TypeSpec;

    fn write(&self, w: &mut RowWriter<'_>) -> Result<()> {
        w.blob("Signature", self.signature)
    }
}

#[derive(Debug, Clone)]
pub struct ImplMap {
    pub mapping_flags: u16,
    pub member_forwarded: MemberForwarded,
    pub import_name: u32,
    pub import_scope: u32,
}

impl Row for ImplMap {
    const TABLE: TableId = TableId::ImplMap;

    fn write(&self, w: &mut RowWriter<'_>) -> Result<()> {
        w.u16(self.mapping_flags);
        w.coded("MemberForwarded", self.member_forwarded)?;
        w.string("ImportName", self.import_name)?;
        w.index("ImportScope", TableId::ModuleRef, self.import_scope)
    }
}

#[derive(Debug, Clone)]
pub struct FieldRva {
    pub rva: u32,
    pub field: u32,
}

impl Row for FieldRva {
    const TABLE: TableId = TableId::FieldRva;

    fn write(&self, w: &mut RowWriter<'_>) -> Result<()> {
        w.u32(self.rva);
        w.index("Field", TableId::Field, self.field)
    }
}

#[derive(Debug, Clone)]
pub struct Assembly {
    pub hash_alg_id: u32,
    pub version: [u16; 4],
    pub flags: u32,
    pub public_key: u32,
    pub name: u32,
    pub culture: u32,
}

impl Row for Assembly {
    const TABLE: TableId = TableId::Assembly;

    fn write(&self, w: &mut RowWriter<'_>) -> Result<()> {
        w.u32(self.hash_alg_id);
        for part in self.version {
            w.u16(part);
        }
        w.u32(self.flags);
        w.blob("PublicKey", self.public_key)?;
        w.string("Name", self.name)?;
        w.string("Culture", self.culture)
    }
}

#[derive(Debug, Clone)]
pub struct AssemblyProcessor {
    pub processor: u32,
}

impl Row for AssemblyProcessor {
    const TABLE: TableId = TableId::AssemblyProcessor;

    fn write(&self, w: &mut RowWriter<'_>) -> Result<()> {
        w.u32(self.processor);
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct AssemblyOs {
    pub platform_id: u32,
    pub major_version: u32,
    pub minor_version: u32,
}

impl Row for AssemblyOs {
    const TABLE: TableId = TableId::AssemblyOs;

    fn write(&self, w: &mut RowWriter<'_>) -> Result<()> {
        w.u32(self.platform_id);
        w.u32(self.major_version);
        w.u32(self.minor_version);
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct AssemblyRef {
    pub version: [u16; 4],
    pub flags: u32,
    pub public_key_or_token: u32,
    pub name: u32,
    pub culture: u32,
    pub hash_value: u32,
}

impl Row for AssemblyRef {
    const TABLE: TableId = TableId::AssemblyRef;

    fn write(&self, w: &mut RowWriter<'_>) -> Result<()> {
        for part in self.version {
            w.u16(part);
        }
        w.u32(self.flags);
        w.blob("PublicKeyOrToken", self.public_key_or_token)?;
        w.string("Name", self.name)?;
        w.string("Culture", self.culture)?;
        w.blob("HashValue", self.hash_value)
    }
}

#[derive(Debug, Clone)]
pub struct AssemblyRefProcessor {
    pub processor: u32,
    pub assembly_ref: u32,
}

impl Row for AssemblyRefProcessor {
    const TABLE: TableId = TableId::AssemblyRefProcessor;

    fn write(&self, w: &mut RowWriter<'_>) -> Result<()> {
        w.u32(self.processor);
        w.index("AssemblyRef", TableId::AssemblyRef, self.assembly_ref)
    }
}

#[derive(Debug, Clone)]
pub struct AssemblyRefOs {
    pub platform_id: u32,
    pub major_version: u32,
    pub minor_version: u32,
    pub assembly_ref: u32,
}

impl Row for AssemblyRefOs {
    const TABLE: TableId = TableId::AssemblyRefOs;

    fn write(&self, w: &mut RowWriter<'_>) -> Result<()> {
        w.u32(self.platform_id);
        w.u32(self.major_version);
        w.u32(self.minor_version);
        w.index("AssemblyRef", TableId::AssemblyRef, self.assembly_ref)
    }
}

#[derive(Debug, Clone)]
pub struct File {
    pub flags: u32,
    pub name: u32,
    pub hash_value: u32,
}

impl Row for File {
    const TABLE: TableId = TableId::File;

    fn write(&self, w: &mut RowWriter<'_>) -> Result<()> {
        w.u32(self.flags);
        w.string("Name", self.name)?;
        w.blob("HashValue", self.hash_value)
    }
}

#[derive(Debug, Clone)]
pub struct ExportedType {
    pub flags: u32,
    /// Hint only: a TypeDef index in the other module, never validated here.
    pub type_def_id: u32,
    pub name: u32,
    pub namespace: u32,
    pub implementation: Implementation,
}

impl Row for ExportedType {
    const TABLE: TableId = TableId::ExportedType;

    fn write(&self, w: &mut RowWriter<'_>) -> Result<()> {
        w.u32(self.flags);
        w.u32(self.type_def_id);
        w.string("TypeName", self.name)?;
        w.string("TypeNamespace", self.namespace)?;
        w.coded("Implementation", self.implementation)
    }
}

#[derive(Debug, Clone)]
pub struct ManifestResource {
    pub offset: u32,
    pub flags: u32,
    pub name: u32,
    /// `None` when the resource lives in this file.
    pub implementation: Option<Implementation>,
}

impl Row for ManifestResource {
    const TABLE: TableId = TableId::ManifestResource;

    fn write(&self, w: &mut RowWriter<'_>) -> Result<()> {
        w.u32(self.offset);
        w.u32(self.flags);
        w.string("Name", self.name)?;
        w.optional_coded("Implementation", self.implementation)
    }
}

#[derive(Debug, Clone)]
pub struct NestedClass {
    pub nested_class: u32,
    pub enclosing_class: u32,
}

impl Row for NestedClass {
    const TABLE: TableId = TableId::NestedClass;

    fn write(&self, w: &mut RowWriter<'_>) -> Result<()> {
        w.index("NestedClass", TableId::TypeDef, self.nested_class)?;
        w.index("EnclosingClass", TableId::TypeDef, self.enclosing_class)
    }
}

#[derive(Debug, Clone)]
pub struct GenericParam {
    pub number: u16,
    pub flags: u16,
    pub owner: TypeOrMethodDef,
    pub name: u32,
}

impl Row for GenericParam {
    const TABLE: TableId = TableId::GenericParam;

    fn write(&self, w: &mut RowWriter<'_>) -> Result<()> {
        w.u16(self.number);
        w.u16(self.flags);
        w.coded("Owner", self.owner)?;
        w.string("Name", self.name)
    }
}

#[derive(Debug, Clone)]
pub struct MethodSpec {
    pub method: MethodDefOrRef,
    pub instantiation: u32,
}

impl Row for MethodSpec {
    const TABLE: TableId = TableId::MethodSpec;

    fn write(&self, w: &mut RowWriter<'_>) -> Result<()> {
        w.coded("Method", self.method)?;
        w.blob("Instantiation", self.instantiation)
    }
}

#[derive(Debug, Clone)]
pub struct GenericParamConstraint {
    pub owner: u32,
    pub constraint: TypeDefOrRef,
}

impl Row for GenericParamConstraint {
    const TABLE: TableId = TableId::GenericParamConstraint;

    fn write(&self, w: &mut RowWriter<'_>) -> Result<()> {
        w.index("Owner", TableId::GenericParam, self.owner)?;
        w.coded("Constraint", self.constraint)
    }
}
