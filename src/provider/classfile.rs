//! JVM class-file reader producing [`ClassDescriptor`]s.
//!
//! Only the parts needed for design metrics are decoded: the constant pool
//! (for names), class access flags, this/super class, interfaces, and the
//! field and method tables. Attributes are skipped.

use crate::core::{ClassDescriptor, FieldDescriptor, MethodDescriptor, Visibility};
use thiserror::Error;

const MAGIC: u32 = 0xCAFE_BABE;

pub const ACC_PUBLIC: u16 = 0x0001;
pub const ACC_PRIVATE: u16 = 0x0002;
pub const ACC_PROTECTED: u16 = 0x0004;
pub const ACC_INTERFACE: u16 = 0x0200;
pub const ACC_ABSTRACT: u16 = 0x0400;
pub const ACC_ENUM: u16 = 0x4000;
pub const ACC_MODULE: u16 = 0x8000;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ClassFileError {
    #[error("not a class file (bad magic {0:#010x})")]
    BadMagic(u32),

    #[error("unexpected end of class file at offset {0}")]
    Truncated(usize),

    #[error("unknown constant pool tag {tag} at index {index}")]
    UnknownConstantTag { tag: u8, index: u16 },

    #[error("constant pool index {0} does not hold the expected entry")]
    BadConstantIndex(u16),

    #[error("malformed type descriptor: {0}")]
    BadDescriptor(String),

    #[error("module descriptor, not a class")]
    ModuleDescriptor,
}

type ParseResult<T> = std::result::Result<T, ClassFileError>;

/// Big-endian cursor over class-file bytes.
struct ByteReader<'a> {
    bytes: &'a [u8],
    offset: usize,
}

impl<'a> ByteReader<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, offset: 0 }
    }

    fn take(&mut self, len: usize) -> ParseResult<&'a [u8]> {
        let end = self
            .offset
            .checked_add(len)
            .filter(|end| *end <= self.bytes.len())
            .ok_or(ClassFileError::Truncated(self.offset))?;
        let slice = &self.bytes[self.offset..end];
        self.offset = end;
        Ok(slice)
    }

    fn u8(&mut self) -> ParseResult<u8> {
        Ok(self.take(1)?[0])
    }

    fn u16(&mut self) -> ParseResult<u16> {
        let b = self.take(2)?;
        Ok(u16::from_be_bytes([b[0], b[1]]))
    }

    fn u32(&mut self) -> ParseResult<u32> {
        let b = self.take(4)?;
        Ok(u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
    }

    fn skip(&mut self, len: usize) -> ParseResult<()> {
        self.take(len).map(|_| ())
    }
}

#[derive(Debug, Clone)]
enum Constant {
    Utf8(String),
    Class { name_index: u16 },
    /// Any entry the metrics never look at
    Other,
    /// Second slot of a long/double entry
    Unusable,
}

struct ConstantPool(Vec<Constant>);

impl ConstantPool {
    fn read(reader: &mut ByteReader<'_>) -> ParseResult<Self> {
        let count = reader.u16()?;
        // Index 0 is never valid
        let mut entries = vec![Constant::Unusable];
        let mut index = 1u16;
        while index < count {
            let tag = reader.u8()?;
            let entry = match tag {
                1 => {
                    let len = reader.u16()? as usize;
                    Constant::Utf8(String::from_utf8_lossy(reader.take(len)?).into_owned())
                }
                7 => Constant::Class {
                    name_index: reader.u16()?,
                },
                // Integer, Float
                3 | 4 => reader.skip(4).map(|_| Constant::Other)?,
                // Long, Double take two slots
                5 | 6 => {
                    reader.skip(8)?;
                    entries.push(Constant::Other);
                    index += 1;
                    Constant::Unusable
                }
                // String, MethodType, Module, Package
                8 | 16 | 19 | 20 => reader.skip(2).map(|_| Constant::Other)?,
                // Field/Method/InterfaceMethod refs, NameAndType, Dynamic, InvokeDynamic
                9 | 10 | 11 | 12 | 17 | 18 => reader.skip(4).map(|_| Constant::Other)?,
                // MethodHandle
                15 => reader.skip(3).map(|_| Constant::Other)?,
                tag => return Err(ClassFileError::UnknownConstantTag { tag, index }),
            };
            entries.push(entry);
            index += 1;
        }
        Ok(Self(entries))
    }

    fn utf8(&self, index: u16) -> ParseResult<&str> {
        match self.0.get(index as usize) {
            Some(Constant::Utf8(value)) => Ok(value),
            _ => Err(ClassFileError::BadConstantIndex(index)),
        }
    }

    /// Qualified (dotted) name of a class constant.
    fn class_name(&self, index: u16) -> ParseResult<String> {
        match self.0.get(index as usize) {
            Some(Constant::Class { name_index }) => {
                Ok(self.utf8(*name_index)?.replace('/', "."))
            }
            _ => Err(ClassFileError::BadConstantIndex(index)),
        }
    }
}

struct MemberInfo {
    access_flags: u16,
    name: String,
    descriptor: String,
}

fn read_members(reader: &mut ByteReader<'_>, pool: &ConstantPool) -> ParseResult<Vec<MemberInfo>> {
    let count = reader.u16()?;
    (0..count)
        .map(|_| {
            let access_flags = reader.u16()?;
            let name = pool.utf8(reader.u16()?)?.to_string();
            let descriptor = pool.utf8(reader.u16()?)?.to_string();
            skip_attributes(reader)?;
            Ok(MemberInfo {
                access_flags,
                name,
                descriptor,
            })
        })
        .collect()
}

fn skip_attributes(reader: &mut ByteReader<'_>) -> ParseResult<()> {
    let count = reader.u16()?;
    for _ in 0..count {
        reader.u16()?;
        let len = reader.u32()? as usize;
        reader.skip(len)?;
    }
    Ok(())
}

fn visibility(access_flags: u16) -> Visibility {
    if access_flags & ACC_PUBLIC != 0 {
        Visibility::Public
    } else if access_flags & ACC_PRIVATE != 0 {
        Visibility::Private
    } else if access_flags & ACC_PROTECTED != 0 {
        Visibility::Protected
    } else {
        Visibility::Package
    }
}

/// Decode one field type starting at `chars[*pos]` into its source form.
fn decode_field_type(descriptor: &str, chars: &[char], pos: &mut usize) -> ParseResult<String> {
    let bad = || ClassFileError::BadDescriptor(descriptor.to_string());
    let mut dimensions = 0;
    while chars.get(*pos) == Some(&'[') {
        dimensions += 1;
        *pos += 1;
    }

    let base = match chars.get(*pos).ok_or_else(bad)? {
        'B' => "byte".to_string(),
        'C' => "char".to_string(),
        'D' => "double".to_string(),
        'F' => "float".to_string(),
        'I' => "int".to_string(),
        'J' => "long".to_string(),
        'S' => "short".to_string(),
        'Z' => "boolean".to_string(),
        'L' => {
            let start = *pos + 1;
            let len = chars[start..].iter().position(|c| *c == ';').ok_or_else(bad)?;
            *pos = start + len;
            chars[start..start + len]
                .iter()
                .map(|c| if *c == '/' { '.' } else { *c })
                .collect()
        }
        _ => return Err(bad()),
    };
    *pos += 1;

    Ok(format!("{base}{}", "[]".repeat(dimensions)))
}

/// Parameter types of a method descriptor, e.g. `(I[Ljava/lang/String;)V`
/// gives `["int", "java.lang.String[]"]`.
pub fn parse_method_parameters(descriptor: &str) -> ParseResult<Vec<String>> {
    let chars: Vec<char> = descriptor.chars().collect();
    if chars.first() != Some(&'(') {
        return Err(ClassFileError::BadDescriptor(descriptor.to_string()));
    }

    let mut pos = 1;
    let mut parameters = Vec::new();
    while chars.get(pos) != Some(&')') {
        if pos >= chars.len() {
            return Err(ClassFileError::BadDescriptor(descriptor.to_string()));
        }
        parameters.push(decode_field_type(descriptor, &chars, &mut pos)?);
    }
    Ok(parameters)
}

/// Source form of a field descriptor, e.g. `[[J` gives `long[][]`.
pub fn parse_field_type(descriptor: &str) -> ParseResult<String> {
    let chars: Vec<char> = descriptor.chars().collect();
    let mut pos = 0;
    decode_field_type(descriptor, &chars, &mut pos)
}

/// Parse a class file into a descriptor.
///
/// Constructors and static initializers are not reported as methods.
pub fn parse_class_file(bytes: &[u8]) -> ParseResult<ClassDescriptor> {
    let mut reader = ByteReader::new(bytes);

    let magic = reader.u32()?;
    if magic != MAGIC {
        return Err(ClassFileError::BadMagic(magic));
    }
    // minor, major
    reader.skip(4)?;

    let pool = ConstantPool::read(&mut reader)?;
    let access_flags = reader.u16()?;
    if access_flags & ACC_MODULE != 0 {
        return Err(ClassFileError::ModuleDescriptor);
    }
    let name = pool.class_name(reader.u16()?)?;
    let super_index = reader.u16()?;
    let superclass = match super_index {
        0 => None,
        index => Some(pool.class_name(index)?),
    };

    let interface_count = reader.u16()?;
    let interfaces = (0..interface_count)
        .map(|_| pool.class_name(reader.u16()?))
        .collect::<ParseResult<Vec<_>>>()?;

    let fields = read_members(&mut reader, &pool)?;
    let methods = read_members(&mut reader, &pool)?;

    let mut class = ClassDescriptor::new(name);
    class.superclass = superclass;
    class.interfaces = interfaces;
    class.is_interface = access_flags & ACC_INTERFACE != 0;
    class.is_abstract = access_flags & ACC_ABSTRACT != 0;
    class.is_enum = access_flags & ACC_ENUM != 0;

    for field in fields {
        let type_name = parse_field_type(&field.descriptor)?;
        class = class.with_field(FieldDescriptor::new(
            field.name,
            type_name,
            visibility(field.access_flags),
        ));
    }

    for method in methods
        .into_iter()
        .filter(|m| m.name != "<init>" && m.name != "<clinit>")
    {
        let mut descriptor = MethodDescriptor::new(method.name, visibility(method.access_flags))
            .with_parameters(parse_method_parameters(&method.descriptor)?);
        descriptor.is_abstract = method.access_flags & ACC_ABSTRACT != 0;
        class = class.with_method(descriptor);
    }

    Ok(class)
}
