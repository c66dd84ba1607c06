//! Builders for test inputs: descriptor universes, class files and jars.
//!
//! | Helper | Purpose |
//! |--------|---------|
//! | [`chain_universe`] | Three-level `A -> B -> C` hierarchy with an override |
//! | [`isolated_universe`] | One class with no members |
//! | [`ClassFileBuilder`] | Minimal but valid JVM class file bytes |
//! | [`write_archive`] | Write named entries into a zip/jar on disk |

use crate::core::{ClassDescriptor, FieldDescriptor, MethodDescriptor, Universe, Visibility};
use std::fs::File;
use std::io::Write;
use std::path::Path;
use zip::write::SimpleFileOptions;

/// `demo.A` declares public `m1` and private `m2`, `demo.B` overrides `m1`,
/// `demo.C` declares nothing.
pub fn chain_universe() -> Universe {
    let a = ClassDescriptor::new("demo.A")
        .with_method(MethodDescriptor::new("m1", Visibility::Public))
        .with_method(MethodDescriptor::new("m2", Visibility::Private));
    let b = ClassDescriptor::new("demo.B")
        .extends("demo.A")
        .with_method(MethodDescriptor::new("m1", Visibility::Public));
    let c = ClassDescriptor::new("demo.C").extends("demo.B");
    [a, b, c].into_iter().collect()
}

pub fn isolated_universe() -> Universe {
    std::iter::once(ClassDescriptor::new("demo.Lonely")).collect()
}

/// A class declaring `public` and `private` fields and methods in the given
/// numbers. Method and field names are unique within the class.
pub fn class_with_members(
    name: &str,
    public_methods: usize,
    private_methods: usize,
    public_fields: usize,
    private_fields: usize,
) -> ClassDescriptor {
    let mut class = ClassDescriptor::new(name);
    for i in 0..public_methods {
        class = class.with_method(MethodDescriptor::new(format!("pub{i}"), Visibility::Public));
    }
    for i in 0..private_methods {
        class = class.with_method(MethodDescriptor::new(format!("hid{i}"), Visibility::Private));
    }
    for i in 0..public_fields {
        class = class.with_field(FieldDescriptor::new(format!("f{i}"), "int", Visibility::Public));
    }
    for i in 0..private_fields {
        class = class.with_field(FieldDescriptor::new(format!("h{i}"), "int", Visibility::Private));
    }
    class
}

const ACC_PUBLIC: u16 = 0x0001;

struct Member {
    access: u16,
    name: u16,
    descriptor: u16,
}

/// Assembles class files the parser accepts: a constant pool of `Utf8` and
/// `Class` entries, members without attributes.
///
/// Names use the internal form (`org/example/Main`). The superclass defaults
/// to `java/lang/Object` and the access flags to `ACC_PUBLIC`.
pub struct ClassFileBuilder {
    pool: Vec<Vec<u8>>,
    access: u16,
    this_class: u16,
    super_class: u16,
    interfaces: Vec<u16>,
    fields: Vec<Member>,
    methods: Vec<Member>,
}

impl ClassFileBuilder {
    pub fn new(internal_name: &str) -> Self {
        let mut builder = Self {
            pool: Vec::new(),
            access: ACC_PUBLIC,
            this_class: 0,
            super_class: 0,
            interfaces: Vec::new(),
            fields: Vec::new(),
            methods: Vec::new(),
        };
        builder.this_class = builder.class_constant(internal_name);
        builder.super_class = builder.class_constant("java/lang/Object");
        builder
    }

    pub fn superclass(mut self, internal_name: &str) -> Self {
        self.super_class = self.class_constant(internal_name);
        self
    }

    pub fn no_superclass(mut self) -> Self {
        self.super_class = 0;
        self
    }

    pub fn interface(mut self, internal_name: &str) -> Self {
        let index = self.class_constant(internal_name);
        self.interfaces.push(index);
        self
    }

    pub fn access(mut self, flags: u16) -> Self {
        self.access = flags;
        self
    }

    pub fn field(mut self, access: u16, name: &str, descriptor: &str) -> Self {
        let member = self.member(access, name, descriptor);
        self.fields.push(member);
        self
    }

    pub fn method(mut self, access: u16, name: &str, descriptor: &str) -> Self {
        let member = self.member(access, name, descriptor);
        self.methods.push(member);
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(&0xCAFE_BABE_u32.to_be_bytes());
        // minor 0, major 52 (Java 8)
        out.extend_from_slice(&[0, 0, 0, 52]);
        push_u16(&mut out, self.pool.len() as u16 + 1);
        for entry in &self.pool {
            out.extend_from_slice(entry);
        }
        push_u16(&mut out, self.access);
        push_u16(&mut out, self.this_class);
        push_u16(&mut out, self.super_class);
        push_u16(&mut out, self.interfaces.len() as u16);
        for &index in &self.interfaces {
            push_u16(&mut out, index);
        }
        for members in [&self.fields, &self.methods] {
            push_u16(&mut out, members.len() as u16);
            for member in members {
                push_u16(&mut out, member.access);
                push_u16(&mut out, member.name);
                push_u16(&mut out, member.descriptor);
                // attributes_count
                push_u16(&mut out, 0);
            }
        }
        // class attributes_count
        push_u16(&mut out, 0);
        out
    }

    fn member(&mut self, access: u16, name: &str, descriptor: &str) -> Member {
        Member {
            access,
            name: self.utf8_constant(name),
            descriptor: self.utf8_constant(descriptor),
        }
    }

    fn utf8_constant(&mut self, value: &str) -> u16 {
        let mut entry = vec![1];
        push_u16(&mut entry, value.len() as u16);
        entry.extend_from_slice(value.as_bytes());
        self.push_constant(entry)
    }

    fn class_constant(&mut self, internal_name: &str) -> u16 {
        let name_index = self.utf8_constant(internal_name);
        let mut entry = vec![7];
        push_u16(&mut entry, name_index);
        self.push_constant(entry)
    }

    fn push_constant(&mut self, entry: Vec<u8>) -> u16 {
        if let Some(existing) = self.pool.iter().position(|e| *e == entry) {
            return existing as u16 + 1;
        }
        self.pool.push(entry);
        self.pool.len() as u16
    }
}

fn push_u16(out: &mut Vec<u8>, value: u16) {
    out.extend_from_slice(&value.to_be_bytes());
}

/// Write `entries` into a zip archive at `path`. Names ending in `/` become
/// directory entries.
pub fn write_archive(path: &Path, entries: &[(&str, Vec<u8>)]) -> zip::result::ZipResult<()> {
    let mut writer = zip::ZipWriter::new(File::create(path)?);
    let options =
        SimpleFileOptions::default().compression_method(zip::CompressionMethod::Stored);
    for (name, bytes) in entries {
        if name.ends_with('/') {
            writer.add_directory(*name, options)?;
        } else {
            writer.start_file(*name, options)?;
            writer.write_all(bytes)?;
        }
    }
    writer.finish()?;
    Ok(())
}
