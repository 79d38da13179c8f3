//! Table identifiers, typed table storage and the row writer.
//!
//! Every row kind implements [`Row`], which names its table and knows how to
//! write its columns through a [`RowWriter`]. The writer knows every row
//! count and heap size, so it picks the column widths and rejects dangling
//! references while writing.

use super::coded::CodedIndex;
use super::rows::*;
use crate::bytes::ByteWriter;
use crate::diagnostics::{InternalError, Result};

/// Metadata table numbers (ECMA-335 II.22).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum TableId {
    Module = 0x00,
    TypeRef = 0x01,
    TypeDef = 0x02,
    Field = 0x04,
    MethodDef = 0x06,
    Param = 0x08,
    InterfaceImpl = 0x09,
    MemberRef = 0x0a,
    Constant = 0x0b,
    CustomAttribute = 0x0c,
    FieldMarshal = 0x0d,
    DeclSecurity = 0x0e,
    ClassLayout = 0x0f,
    FieldLayout = 0x10,
    StandAloneSig = 0x11,
    EventMap = 0x12,
    Event = 0x14,
    PropertyMap = 0x15,
    Property = 0x17,
    MethodSemantics = 0x18,
    MethodImpl = 0x19,
    ModuleRef = 0x1a,
    TypeSpec = 0x1b,
    ImplMap = 0x1c,
    FieldRva = 0x1d,
    Assembly = 0x20,
    AssemblyProcessor = 0x21,
    AssemblyOs = 0x22,
    AssemblyRef = 0x23,
    AssemblyRefProcessor = 0x24,
    AssemblyRefOs = 0x25,
    File = 0x26,
    ExportedType = 0x27,
    ManifestResource = 0x28,
    NestedClass = 0x29,
    GenericParam = 0x2a,
    MethodSpec = 0x2b,
    GenericParamConstraint = 0x2c,
}

impl TableId {
    /// Every table, in ascending table number order.
    pub const ALL: [TableId; 38] = [
        TableId::Module,
        TableId::TypeRef,
        TableId::TypeDef,
        TableId::Field,
        TableId::MethodDef,
        TableId::Param,
        TableId::InterfaceImpl,
        TableId::MemberRef,
        TableId::Constant,
        TableId::CustomAttribute,
        TableId::FieldMarshal,
        TableId::DeclSecurity,
        TableId::ClassLayout,
        TableId::FieldLayout,
        TableId::StandAloneSig,
        TableId::EventMap,
        TableId::Event,
        TableId::PropertyMap,
        TableId::Property,
        TableId::MethodSemantics,
        TableId::MethodImpl,
        TableId::ModuleRef,
        TableId::TypeSpec,
        TableId::ImplMap,
        TableId::FieldRva,
        TableId::Assembly,
        TableId::AssemblyProcessor,
        TableId::AssemblyOs,
        TableId::AssemblyRef,
        TableId::AssemblyRefProcessor,
        TableId::AssemblyRefOs,
        TableId::File,
        TableId::ExportedType,
        TableId::ManifestResource,
        TableId::NestedClass,
        TableId::GenericParam,
        TableId::MethodSpec,
        TableId::GenericParamConstraint,
    ];

    /// Tables a loader expects sorted by their primary key column.
    pub const SORTED: [TableId; 14] = [
        TableId::InterfaceImpl,
        TableId::Constant,
        TableId::CustomAttribute,
        TableId::FieldMarshal,
        TableId::DeclSecurity,
        TableId::ClassLayout,
        TableId::FieldLayout,
        TableId::MethodSemantics,
        TableId::MethodImpl,
        TableId::ImplMap,
        TableId::FieldRva,
        TableId::NestedClass,
        TableId::GenericParam,
        TableId::GenericParamConstraint,
    ];

    pub fn number(self) -> u8 {
        self as u8
    }

    /// Token of row `index` of this table.
    pub fn token(self, index: u32) -> u32 {
        (u32::from(self.number()) << 24) | index
    }

    pub fn name(self) -> &'static str {
        match self {
            TableId::Module => "Module",
            TableId::TypeRef => "TypeRef",
            TableId::TypeDef => "TypeDef",
            TableId::Field => "Field",
            TableId::MethodDef => "MethodDef",
            TableId::Param => "Param",
            TableId::InterfaceImpl => "InterfaceImpl",
            TableId::MemberRef => "MemberRef",
            TableId::Constant => "Constant",
            TableId::CustomAttribute => "CustomAttribute",
            TableId::FieldMarshal => "FieldMarshal",
            TableId::DeclSecurity => "DeclSecurity",
            TableId::ClassLayout => "ClassLayout",
            TableId::FieldLayout => "FieldLayout",
            TableId::StandAloneSig => "StandAloneSig",
            TableId::EventMap => "EventMap",
            TableId::Event => "Event",
            TableId::PropertyMap => "PropertyMap",
            TableId::Property => "Property",
            TableId::MethodSemantics => "MethodSemantics",
            TableId::MethodImpl => "MethodImpl",
            TableId::ModuleRef => "ModuleRef",
            TableId::TypeSpec => "TypeSpec",
            TableId::ImplMap => "ImplMap",
            TableId::FieldRva => "FieldRVA",
            TableId::Assembly => "Assembly",
            TableId::AssemblyProcessor => "AssemblyProcessor",
            TableId::AssemblyOs => "AssemblyOS",
            TableId::AssemblyRef => "AssemblyRef",
            TableId::AssemblyRefProcessor => "AssemblyRefProcessor",
            TableId::AssemblyRefOs => "AssemblyRefOS",
            TableId::File => "File",
            TableId::ExportedType => "ExportedType",
            TableId::ManifestResource => "ManifestResource",
            TableId::NestedClass => "NestedClass",
            TableId::GenericParam => "GenericParam",
            TableId::MethodSpec => "MethodSpec",
            TableId::GenericParamConstraint => "GenericParamConstraint",
        }
    }

    /// `Sorted` bitmask of the tables stream header.
    pub fn sorted_mask() -> u64 {
        Self::SORTED
            .iter()
            .fold(0, |mask, table| mask | (1u64 << table.number()))
    }
}

/// Rows of one table, in insertion order.
#[derive(Debug, Clone)]
pub struct Table<R> {
    rows: Vec<R>,
}

impl<R> Default for Table<R> {
    fn default() -> Self {
        Self { rows: Vec::new() }
    }
}

impl<R> Table<R> {
    /// Appends a row and returns its 1-based index.
    pub fn push(&mut self, row: R) -> u32 {
        self.rows.push(row);
        self.rows.len() as u32
    }

    pub fn len(&self) -> u32 {
        self.rows.len() as u32
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Row by 1-based index.
    pub fn get(&self, index: u32) -> Option<&R> {
        index
            .checked_sub(1)
            .and_then(|i| self.rows.get(i as usize))
    }

    pub fn get_mut(&mut self, index: u32) -> Option<&mut R> {
        index
            .checked_sub(1)
            .and_then(|i| self.rows.get_mut(i as usize))
    }

    pub fn rows(&self) -> &[R] {
        &self.rows
    }
}

/// A fixed-layout metadata record.
pub trait Row: RowTable {
    const TABLE: TableId;

    /// Writes the columns of this row in declaration order.
    fn write(&self, w: &mut RowWriter<'_>) -> Result<()>;
}

/// Object-safe view of a [`Table`], used to walk all tables in order.
pub trait AnyTable {
    fn id(&self) -> TableId;

    fn row_count(&self) -> u32;

    fn write_rows(&self, w: &mut RowWriter<'_>) -> Result<()>;
}

impl<R: Row> AnyTable for Table<R> {
    fn id(&self) -> TableId {
        R::TABLE
    }

    fn row_count(&self) -> u32 {
        self.len()
    }

    fn write_rows(&self, w: &mut RowWriter<'_>) -> Result<()> {
        for (i, row) in self.rows.iter().enumerate() {
            w.row = i as u32 + 1;
            w.table = R::TABLE;
            row.write(w)?;
        }
        Ok(())
    }
}

macro_rules! define_tables {
    ($($field:ident: $row:ident,)*) => {
        /// One typed table per metadata table kind.
        #[derive(Debug, Clone, Default)]
        pub struct Tables {
            $(pub $field: Table<$row>,)*
        }

        impl Tables {
            /// All tables in ascending table number order.
            pub fn all(&self) -> [&dyn AnyTable; 38] {
                [$(&self.$field as &dyn AnyTable,)*]
            }
        }

        $(
            impl RowTable for $row {
                fn table(tables: &Tables) -> &Table<Self> {
                    &tables.$field
                }

                fn table_mut(tables: &mut Tables) -> &mut Table<Self> {
                    &mut tables.$field
                }
            }
        )*
    };
}

/// Table accessors for each row type, generated alongside [`Tables`].
pub trait RowTable: Sized {
    fn table(tables: &Tables) -> &Table<Self>;

    fn table_mut(tables: &mut Tables) -> &mut Table<Self>;
}

define_tables! {
    module: Module,
    type_ref: TypeRef,
    type_def: TypeDef,
    field: Field,
    method_def: MethodDef,
    param: Param,
    interface_impl: InterfaceImpl,
    member_ref: MemberRef,
    constant: Constant,
    custom_attribute: CustomAttribute,
    field_marshal: FieldMarshal,
    decl_security: DeclSecurity,
    class_layout: ClassLayout,
    field_layout: FieldLayout,
    stand_alone_sig: StandAloneSig,
    event_map: EventMap,
    event: Event,
    property_map: PropertyMap,
    property: Property,
    method_semantics: MethodSemantics,
    method_impl: MethodImpl,
    module_ref: ModuleRef,
    type_spec: TypeSpec,
    impl_map: ImplMap,
    field_rva: FieldRva,
    assembly: Assembly,
    assembly_processor: AssemblyProcessor,
    assembly_os: AssemblyOs,
    assembly_ref: AssemblyRef,
    assembly_ref_processor: AssemblyRefProcessor,
    assembly_ref_os: AssemblyRefOs,
    file: File,
    exported_type: ExportedType,
    manifest_resource: ManifestResource,
    nested_class: NestedClass,
    generic_param: GenericParam,
    method_spec: MethodSpec,
    generic_param_constraint: GenericParamConstraint,
}

impl Tables {
    pub fn row_count(&self, table: TableId) -> u32 {
        self.all()
            .iter()
            .find(|t| t.id() == table)
            .map_or(0, |t| t.row_count())
    }

    /// `Valid` bitmask: bit `k` is set iff table `k` has rows.
    pub fn valid_mask(&self) -> u64 {
        self.all()
            .iter()
            .filter(|t| t.row_count() > 0)
            .fold(0, |mask, t| mask | (1u64 << t.id().number()))
    }

    /// Writes the tables stream (header, row counts, rows).
    pub fn serialize(&self, heaps: HeapSizes) -> Result<Vec<u8>> {
        use crate::constants::metadata::{
            HEAP_SIZES, RESERVED2, TABLES_MAJOR_VERSION, TABLES_MINOR_VERSION,
        };

        let mut row_counts = [0u32; 64];
        for table in self.all() {
            row_counts[table.id().number() as usize] = table.row_count();
        }

        let mut out = ByteWriter::new();
        out.write_u32(0);
        out.write_u8(TABLES_MAJOR_VERSION);
        out.write_u8(TABLES_MINOR_VERSION);
        out.write_u8(HEAP_SIZES);
        out.write_u8(RESERVED2);
        out.write_u64(self.valid_mask());
        out.write_u64(TableId::sorted_mask());
        for table in self.all() {
            if table.row_count() > 0 {
                out.write_u32(table.row_count());
            }
        }

        let mut writer = RowWriter {
            out: &mut out,
            row_counts,
            heaps,
            table: TableId::Module,
            row: 0,
        };
        for table in self.all() {
            table.write_rows(&mut writer)?;
        }
        Ok(out.finish())
    }
}

/// Sizes the row writer checks heap columns against.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeapSizes {
    pub strings: u32,
    pub blobs: u32,
    pub guids: u32,
}

/// Writes row columns with validated references and computed widths.
pub struct RowWriter<'a> {
    out: &'a mut ByteWriter,
    row_counts: [u32; 64],
    heaps: HeapSizes,
    table: TableId,
    row: u32,
}

impl RowWriter<'_> {
    pub fn u8(&mut self, v: u8) {
        self.out.write_u8(v);
    }

    pub fn u16(&mut self, v: u16) {
        self.out.write_u16(v);
    }

    pub fn u32(&mut self, v: u32) {
        self.out.write_u32(v);
    }

    /// Value of a late-bound field; fails if it was never filled in.
    pub fn late_bound(&self, field: &'static str, value: Option<u32>) -> Result<u32> {
        value.ok_or_else(|| InternalError::unset(self.table.name(), field))
    }

    pub fn string(&mut self, column: &'static str, offset: u32) -> Result<()> {
        self.heap_offset(column, "#Strings", offset, self.heaps.strings)
    }

    pub fn blob(&mut self, column: &'static str, offset: u32) -> Result<()> {
        self.heap_offset(column, "#Blob", offset, self.heaps.blobs)
    }

    /// GUID column: a 1-based GUID index, 0 for none.
    pub fn guid(&mut self, column: &'static str, index: u32) -> Result<()> {
        if index > self.heaps.guids {
            return Err(self.bad_heap(column, "#GUID", index));
        }
        self.out.write_u32(index);
        Ok(())
    }

    /// Simple index into `target`; must name an existing row.
    pub fn index(&mut self, column: &'static str, target: TableId, index: u32) -> Result<()> {
        let count = self.count(target);
        if index == 0 || index > count {
            return Err(self.dangling(column, target, index));
        }
        self.write_index(count, index);
        Ok(())
    }

    /// Start of a run of rows owned by this row; may point one past the end.
    pub fn list(&mut self, column: &'static str, target: TableId, index: u32) -> Result<()> {
        let count = self.count(target);
        if index == 0 || index > count + 1 {
            return Err(self.dangling(column, target, index));
        }
        self.write_index(count, index);
        Ok(())
    }

    pub fn coded<C: CodedIndex>(&mut self, column: &'static str, value: C) -> Result<()> {
        let (target, index) = value.target();
        let encoded = value.encode().ok_or_else(|| InternalError::InvalidCodedIndex {
            table: self.table.name(),
            row: self.row,
            column,
            kind: C::KIND.name(),
            target: target.name(),
        })?;
        if index == 0 || index > self.count(target) {
            return Err(self.dangling(column, target, index));
        }
        self.write_coded::<C>(encoded);
        Ok(())
    }

    /// Coded index column that may be null.
    pub fn optional_coded<C: CodedIndex>(
        &mut self,
        column: &'static str,
        value: Option<C>,
    ) -> Result<()> {
        match value {
            Some(value) => self.coded(column, value),
            None => {
                self.write_coded::<C>(0);
                Ok(())
            }
        }
    }

    fn count(&self, table: TableId) -> u32 {
        self.row_counts[table.number() as usize]
    }

    fn write_index(&mut self, count: u32, index: u32) {
        if count < 1 << 16 {
            self.out.write_u16(index as u16);
        } else {
            self.out.write_u32(index);
        }
    }

    fn write_coded<C: CodedIndex>(&mut self, encoded: u32) {
        let kind = C::KIND;
        let max_rows = kind
            .tables()
            .iter()
            .flatten()
            .map(|t| self.count(*t))
            .max()
            .unwrap_or(0);
        if max_rows < 1 << (16 - kind.tag_bits()) {
            self.out.write_u16(encoded as u16);
        } else {
            self.out.write_u32(encoded);
        }
    }

    fn heap_offset(
        &mut self,
        column: &'static str,
        heap: &'static str,
        offset: u32,
        size: u32,
    ) -> Result<()> {
        if offset != 0 && offset >= size {
            return Err(self.bad_heap(column, heap, offset));
        }
        self.out.write_u32(offset);
        Ok(())
    }

    fn bad_heap(&self, column: &'static str, heap: &'static str, offset: u32) -> InternalError {
        InternalError::BadHeapReference {
            table: self.table.name(),
            row: self.row,
            column,
            heap,
            offset,
        }
    }

    fn dangling(&self, column: &'static str, target: TableId, index: u32) -> InternalError {
        InternalError::DanglingReference {
            table: self.table.name(),
            row: self.row,
            column,
            target: target.name(),
            index,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::coded::ResolutionScope;

    // Bytes one row takes when the tables hold `counts` rows.
    fn row_size<R: Row>(row: &R, counts: &[(TableId, u32)]) -> Result<usize> {
        let mut row_counts = [0u32; 64];
        for (table, count) in counts {
            row_counts[table.number() as usize] = *count;
        }
        let mut out = ByteWriter::new();
        let mut writer = RowWriter {
            out: &mut out,
            row_counts,
            heaps: HeapSizes { strings: 4, blobs: 4, guids: 0 },
            table: R::TABLE,
            row: 1,
        };
        row.write(&mut writer)?;
        Ok(out.len())
    }

    #[test]
    fn simple_index_widens_at_65536_rows() -> Result<()> {
        let nested = NestedClass {
            nested_class: 1,
            enclosing_class: 1,
        };
        assert_eq!(row_size(&nested, &[(TableId::TypeDef, 0xffff)])?, 4);
        assert_eq!(row_size(&nested, &[(TableId::TypeDef, 0x1_0000)])?, 8);
        Ok(())
    }

    #[test]
    fn coded_index_widens_with_its_tag_bits() -> Result<()> {
        let type_ref = TypeRef {
            resolution_scope: ResolutionScope::AssemblyRef(1),
            name: 0,
            namespace: 0,
        };
        assert_eq!(row_size(&type_ref, &[(TableId::AssemblyRef, 0x3fff)])?, 10);
        assert_eq!(row_size(&type_ref, &[(TableId::AssemblyRef, 0x4000)])?, 12);
        // any candidate table counts, not only the referenced one
        assert_eq!(
            row_size(
                &type_ref,
                &[(TableId::AssemblyRef, 1), (TableId::TypeRef, 0x4000)]
            )?,
            12
        );
        Ok(())
    }

    #[test]
    fn all_is_ascending_and_complete() {
        let tables = Tables::default();
        let ids: Vec<TableId> = tables.all().iter().map(|t| t.id()).collect();
        assert_eq!(ids, TableId::ALL.to_vec());
        assert!(ids.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn sorted_mask_matches_the_canonical_value() {
        assert_eq!(TableId::sorted_mask(), 0x0000_1600_3301_fa00);
    }

    #[test]
    fn tokens_put_the_table_in_the_top_byte() {
        assert_eq!(TableId::MethodDef.token(1), 0x0600_0001);
        assert_eq!(TableId::MemberRef.token(0x12), 0x0a00_0012);
    }

    #[test]
    fn table_get_is_one_based() {
        let mut table = Table::default();
        assert_eq!(table.push(ModuleRef { name: 4 }), 1);
        assert_eq!(table.push(ModuleRef { name: 8 }), 2);
        assert!(table.get(0).is_none());
        assert_eq!(table.get(2).map(|r| r.name), Some(8));
    }

    #[test]
    fn list_columns_may_point_one_past_the_end() -> Result<()> {
        let mut tables = Tables::default();
        tables.type_def.push(TypeDef {
            flags: 0,
            name: 0,
            namespace: 0,
            extends: None,
            field_list: 1,
            method_list: 1,
        });
        let heaps = HeapSizes { strings: 4, blobs: 4, guids: 0 };
        tables.serialize(heaps)?;

        tables.type_def = Table::default();
        tables.type_def.push(TypeDef {
            flags: 0,
            name: 0,
            namespace: 0,
            extends: None,
            field_list: 2,
            method_list: 1,
        });
        let err = tables.serialize(heaps).unwrap_err();
        assert!(matches!(
            err,
            InternalError::DanglingReference { table: "TypeDef", column: "FieldList", index: 2, .. }
        ));
        Ok(())
    }

    #[test]
    fn heap_offsets_past_the_end_are_rejected() {
        let mut tables = Tables::default();
        tables.module_ref.push(ModuleRef { name: 12 });
        let err = tables
            .serialize(HeapSizes { strings: 12, blobs: 4, guids: 0 })
            .unwrap_err();
        assert!(matches!(
            err,
            InternalError::BadHeapReference { heap: "#Strings", offset: 12, .. }
        ));
    }
}
