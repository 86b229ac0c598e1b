//! Text templates for the generated Alembic configuration and environment script.

/// Prefix of the single `alembic.ini` line that carries the database URL.
pub const SQLALCHEMY_URL_KEY: &str = "sqlalchemy.url";

/// URL written into a fresh `alembic.ini` before the real one is injected.
pub const PLACEHOLDER_URL: &str = "sqlite:///alembic.sqlite";

pub fn alembic_ini() -> String {
    ALEMBIC_INI_TEMPLATE.replace("{{URL}}", PLACEHOLDER_URL)
}

/// `migrations/env.py` with `uri` embedded as a Python string literal.
pub fn env_script(uri: &str) -> String {
    ENV_SCRIPT_TEMPLATE.replace("{{URL}}", &python_single_quoted(uri))
}

pub(crate) fn python_single_quoted(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('\'');
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '\n' => out.push_str("\\n"),
            c => out.push(c),
        }
    }
    out.push('\'');
    out
}

const ALEMBIC_INI_TEMPLATE: &str = r#"[alembic]
# path to migration scripts, relative to this file
script_location = migrations

# template used to generate migration file names
# file_template = %%(year)d_%%(month).2d_%%(day).2d_%%(hour).2d%%(minute).2d-%%(rev)s_%%(slug)s

# prepended to sys.path so sqlalchemy_models/ is importable
prepend_sys_path = .

# max length of characters to apply to the "slug" field
# truncate_slug_length = 40

version_path_separator = os

sqlalchemy.url = {{URL}}


[post_write_hooks]

# Logging configuration
[loggers]
keys = root,sqlalchemy,alembic

[handlers]
keys = console

[formatters]
keys = generic

[logger_root]
level = WARN
handlers = console
qualname =

[logger_sqlalchemy]
level = WARN
handlers =
qualname = sqlalchemy.engine

[logger_alembic]
level = INFO
handlers =
qualname = alembic

[handler_console]
class = StreamHandler
args = (sys.stderr,)
level = NOTSET
formatter = generic

[formatter_generic]
format = %(levelname)-5.5s [%(name)s] %(message)s
datefmt = %H:%M:%S
"#;

const ENV_SCRIPT_TEMPLATE: &str = r#"import importlib.util
import os
import sys

from alembic import context
from sqlalchemy import create_engine

sys.path.append(".")

MODELS_PATH = "sqlalchemy_models"


def load_models():
    for filename in sorted(os.listdir(MODELS_PATH)):
        if not filename.endswith(".py") or filename == "__init__.py":
            continue
        module_name = "sqlalchemy_models." + filename[:-3]
        if module_name in sys.modules:
            continue
        spec = importlib.util.spec_from_file_location(
            module_name, os.path.join(MODELS_PATH, filename)
        )
        module = importlib.util.module_from_spec(spec)
        sys.modules[module_name] = module
        spec.loader.exec_module(module)


load_models()

from sqlalchemy_models.base import Base  # noqa: E402

url = {{URL}}
config = context.config
config.set_main_option("sqlalchemy.url", url)

target_metadata = Base.metadata


def run_migrations_offline():
    context.configure(
        url=url,
        target_metadata=target_metadata,
        literal_binds=True,
        include_schemas=True,
    )
    with context.begin_transaction():
        context.run_migrations()


def run_migrations_online():
    connectable = create_engine(url)
    with connectable.connect() as connection:
        context.configure(
            connection=connection,
            target_metadata=target_metadata,
            include_schemas=True,
        )
        with context.begin_transaction():
            context.run_migrations()


if context.is_offline_mode():
    run_migrations_offline()
else:
    run_migrations_online()
"#;
