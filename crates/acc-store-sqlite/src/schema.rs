//! SQL schema for the statistics store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS users (
    id               INTEGER PRIMARY KEY,
    username         TEXT NOT NULL UNIQUE,
    onwiki_name      TEXT NOT NULL,
    status           TEXT NOT NULL DEFAULT 'New',  -- New | Active | Deactivated | Declined
    force_identified INTEGER,                      -- NULL = unset, 1 = on, 0 = off
    created_at       TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS user_roles (
    user_id INTEGER NOT NULL REFERENCES users(id),
    role    TEXT NOT NULL,
    UNIQUE (user_id, role)
);

CREATE TABLE IF NOT EXISTS requests (
    id   INTEGER PRIMARY KEY,
    name TEXT NOT NULL
);

-- The action log is append-only; nothing in this workspace writes to it.
-- `user_id` is the actor and may refer to a user that no longer exists.
CREATE TABLE IF NOT EXISTS log (
    id          INTEGER PRIMARY KEY,
    timestamp   TEXT NOT NULL,     -- RFC 3339 UTC
    user_id     INTEGER NOT NULL,
    action      TEXT NOT NULL,     -- e.g. 'Approved', 'Closed 12'
    object_type TEXT NOT NULL,     -- e.g. 'User', 'Request'
    object_id   INTEGER NOT NULL,
    comment     TEXT
);

-- Close templates; `default_action` is the rule table.
CREATE TABLE IF NOT EXISTS email_templates (
    id             INTEGER PRIMARY KEY,
    name           TEXT NOT NULL,
    default_action TEXT            -- 'created' | 'not created' | 'defer' | 'none' | NULL
);

-- Display labels for closure actions.
CREATE VIEW IF NOT EXISTS closes AS
    SELECT 'Closed ' || id AS closes, name AS mail_desc FROM email_templates
    UNION ALL SELECT 'Closed 0',        'Dropped'
    UNION ALL SELECT 'Closed custom',   'Closed custom'
    UNION ALL SELECT 'Closed custom-n', 'Closed custom - Not created'
    UNION ALL SELECT 'Closed custom-y', 'Closed custom - Created';

-- Wiki names the identification check found, and when it last did.
CREATE TABLE IF NOT EXISTS id_cache (
    onwiki_name TEXT PRIMARY KEY,
    check_time  TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS oauth_tokens (
    user_id    INTEGER NOT NULL REFERENCES users(id),
    token_type TEXT NOT NULL,    -- 'request' | 'access'
    token      TEXT NOT NULL,
    expiry     TEXT,
    UNIQUE (user_id, token_type)
);

CREATE TABLE IF NOT EXISTS oauth_identities (
    user_id    INTEGER PRIMARY KEY REFERENCES users(id),
    username   TEXT NOT NULL,
    edit_count INTEGER NOT NULL DEFAULT 0,
    grants     TEXT NOT NULL DEFAULT '[]',   -- JSON array of grant names
    blocked    INTEGER NOT NULL DEFAULT 0,
    issued_at  TEXT NOT NULL,
    expires_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS log_actor_idx  ON log(user_id);
CREATE INDEX IF NOT EXISTS log_object_idx ON log(object_type, object_id);

PRAGMA user_version = 1;
";
