//! SQLAlchemy model generation.
//!
//! Model definitions are declared in `blitz.yaml` and rendered into one
//! Python module per table inside the workspace's `sqlalchemy_models/`
//! directory. Every module imports the shared declarative `Base` from
//! `base.py`, which `env.py` later uses as the migration target metadata.

use crate::alembic::templates::python_single_quoted;
use crate::error::{BlitzError, Result};
use crate::io;
use crate::paths::validate_identifier;
use crate::reporter::Reporter;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

pub const BASE_MODULE: &str = "base.py";

const BASE_MODULE_CONTENT: &str = "\
from sqlalchemy.orm import declarative_base

Base = declarative_base()
";

// ---------------------------------------------------------------------------
// Definitions
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnType {
    Integer,
    BigInteger,
    String,
    Text,
    Boolean,
    DateTime,
    Date,
    Float,
    Numeric,
    Uuid,
    Json,
}

impl ColumnType {
    /// Name of the matching `sqlalchemy` type class.
    pub fn sqlalchemy_name(&self) -> &'static str {
        match self {
            ColumnType::Integer => "Integer",
            ColumnType::BigInteger => "BigInteger",
            ColumnType::String => "String",
            ColumnType::Text => "Text",
            ColumnType::Boolean => "Boolean",
            ColumnType::DateTime => "DateTime",
            ColumnType::Date => "Date",
            ColumnType::Float => "Float",
            ColumnType::Numeric => "Numeric",
            ColumnType::Uuid => "Uuid",
            ColumnType::Json => "JSON",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnDefinition {
    pub name: String,
    #[serde(rename = "type")]
    pub column_type: ColumnType,
    #[serde(default)]
    pub primary_key: bool,
    #[serde(default = "default_nullable")]
    pub nullable: bool,
    #[serde(default)]
    pub unique: bool,
    /// `schema.table.column` or `table.column`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub foreign_key: Option<String>,
    /// Client-side default passed to `Column(default=...)`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<ColumnDefault>,
}

/// Scalar default as written in YAML.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ColumnDefault {
    Bool(bool),
    Integer(i64),
    Float(f64),
    Text(String),
}

impl ColumnDefault {
    /// Python literal for this value.
    pub fn python_literal(&self) -> String {
        match self {
            ColumnDefault::Bool(true) => "True".to_string(),
            ColumnDefault::Bool(false) => "False".to_string(),
            ColumnDefault::Integer(n) => n.to_string(),
            ColumnDefault::Float(f) if f.is_finite() => format!("{f:?}"),
            ColumnDefault::Float(f) => format!("float('{f}')"),
            ColumnDefault::Text(s) => python_single_quoted(s),
        }
    }
}

fn default_nullable() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelDefinition {
    pub class_name: String,
    pub table_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
    #[serde(default)]
    pub columns: Vec<ColumnDefinition>,
}

impl ModelDefinition {
    pub fn validate(&self) -> Result<()> {
        validate_identifier(&self.class_name)?;
        validate_identifier(&self.table_name)?;
        if let Some(schema) = &self.schema {
            validate_identifier(schema)?;
        }
        for column in &self.columns {
            validate_identifier(&column.name)?;
            if let Some(fk) = &column.foreign_key {
                let parts: Vec<&str> = fk.split('.').collect();
                if !(2..=3).contains(&parts.len()) {
                    return Err(BlitzError::InvalidIdentifier(fk.clone()));
                }
                for part in parts {
                    validate_identifier(part)?;
                }
            }
        }
        Ok(())
    }

    pub fn file_name(&self) -> String {
        format!("{}.py", self.table_name)
    }

    /// Render the Python module for this model.
    pub fn render(&self) -> String {
        let mut imports: BTreeSet<&str> = self
            .columns
            .iter()
            .map(|c| c.column_type.sqlalchemy_name())
            .collect();
        if self.columns.iter().any(|c| c.foreign_key.is_some()) {
            imports.insert("ForeignKey");
        }
        let mut names = vec!["Column"];
        names.extend(imports);

        let mut out = String::new();
        let _ = writeln!(out, "from sqlalchemy import {}", names.join(", "));
        out.push_str("from sqlalchemy_models.base import Base\n\n\n");
        let _ = writeln!(out, "class {}(Base):", self.class_name);
        let _ = writeln!(out, "    __tablename__ = '{}'", self.table_name);
        if let Some(schema) = &self.schema {
            let _ = writeln!(out, "    __table_args__ = {{'schema': '{schema}'}}");
        }
        if self.columns.is_empty() {
            out.push_str("    pass\n");
            return out;
        }
        out.push('\n');
        for column in &self.columns {
            let _ = writeln!(out, "    {} = {}", column.name, render_column(column));
        }
        out
    }
}

fn render_column(column: &ColumnDefinition) -> String {
    let mut args = vec![column.column_type.sqlalchemy_name().to_string()];
    if let Some(fk) = &column.foreign_key {
        args.push(format!("ForeignKey('{fk}')"));
    }
    if column.primary_key {
        args.push("primary_key=True".to_string());
    } else if !column.nullable {
        args.push("nullable=False".to_string());
    }
    if column.unique {
        args.push("unique=True".to_string());
    }
    if let Some(default) = &column.default {
        args.push(format!("default={}", default.python_literal()));
    }
    format!("Column({})", args.join(", "))
}

// ---------------------------------------------------------------------------
// ModelManager
// ---------------------------------------------------------------------------

/// Writes model modules into a workspace's models directory.
pub struct ModelManager<'a> {
    models_dir: PathBuf,
    reporter: &'a dyn Reporter,
}

impl<'a> ModelManager<'a> {
    pub fn new(models_dir: &Path, reporter: &'a dyn Reporter) -> Self {
        Self {
            models_dir: models_dir.to_path_buf(),
            reporter,
        }
    }

    /// Write `base.py` unless the models directory already has one (for
    /// example one copied from the project's own models).
    pub fn ensure_base(&self) -> Result<bool> {
        let path = self.models_dir.join(BASE_MODULE);
        if path.exists() {
            return Ok(false);
        }
        io::atomic_write(&path, BASE_MODULE_CONTENT.as_bytes())?;
        self.reporter
            .info(&format!("Created declarative base at {}", path.display()));
        Ok(true)
    }

    pub fn create_model(&self, definition: &ModelDefinition) -> Result<PathBuf> {
        definition.validate()?;
        let path = self.models_dir.join(definition.file_name());
        io::atomic_write(&path, definition.render().as_bytes())?;
        self.reporter.success(&format!(
            "Created model {} at {}",
            definition.class_name,
            path.display()
        ));
        Ok(path)
    }
}
