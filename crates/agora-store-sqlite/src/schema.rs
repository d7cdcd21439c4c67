//! SQL schema for the Agora SQLite store.
//!
//! Executed once at connection startup. Idempotent thanks to
//! `IF NOT EXISTS`; there are no migrations.
//!
//! Compound keys are partial unique indexes over rows whose `deleted_at` is
//! NULL, so a soft-deleted row never blocks its replacement. Nullable key
//! columns are wrapped in `COALESCE` because SQLite treats NULLs as distinct.

pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS members (
    id            TEXT PRIMARY KEY,
    email         TEXT NOT NULL,
    display_name  TEXT NOT NULL,
    bio           TEXT,
    role          TEXT NOT NULL CHECK (role IN ('member', 'moderator', 'admin')),
    status        TEXT NOT NULL CHECK (status IN ('active', 'suspended')),
    password_hash TEXT NOT NULL,
    created_at    TEXT NOT NULL,
    updated_at    TEXT NOT NULL,
    deleted_at    TEXT
);

CREATE TABLE IF NOT EXISTS posts (
    id         TEXT PRIMARY KEY,
    author_id  TEXT NOT NULL REFERENCES members(id),
    title      TEXT NOT NULL,
    body       TEXT NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    deleted_at TEXT
);

CREATE TABLE IF NOT EXISTS comments (
    id         TEXT PRIMARY KEY,
    post_id    TEXT NOT NULL REFERENCES posts(id),
    author_id  TEXT NOT NULL REFERENCES members(id),
    body       TEXT NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    deleted_at TEXT
);

CREATE TABLE IF NOT EXISTS reports (
    id                  TEXT PRIMARY KEY,
    reporter_id         TEXT NOT NULL REFERENCES members(id),
    content_type        TEXT NOT NULL,
    reported_post_id    TEXT REFERENCES posts(id),
    reported_comment_id TEXT REFERENCES comments(id),
    reason              TEXT NOT NULL,
    status              TEXT NOT NULL CHECK (status IN ('pending', 'resolved', 'dismissed')),
    resolved_by         TEXT REFERENCES members(id),
    resolution_note     TEXT,
    created_at          TEXT NOT NULL,
    updated_at          TEXT NOT NULL,
    deleted_at          TEXT,
    CHECK (
        (content_type = 'post'    AND reported_post_id IS NOT NULL AND reported_comment_id IS NULL) OR
        (content_type = 'comment' AND reported_comment_id IS NOT NULL AND reported_post_id IS NULL)
    )
);

CREATE TABLE IF NOT EXISTS moderation_actions (
    id                TEXT PRIMARY KEY,
    moderator_id      TEXT NOT NULL REFERENCES members(id),
    action_type       TEXT NOT NULL
                      CHECK (action_type IN ('warning', 'content_removal', 'suspension', 'ban')),
    content_type      TEXT NOT NULL,
    target_member_id  TEXT REFERENCES members(id),
    target_post_id    TEXT REFERENCES posts(id),
    target_comment_id TEXT REFERENCES comments(id),
    reason            TEXT NOT NULL,
    revoked_at        TEXT,
    created_at        TEXT NOT NULL,
    updated_at        TEXT NOT NULL,
    deleted_at        TEXT,
    CHECK (
        (content_type = 'member'  AND target_member_id IS NOT NULL
                                  AND target_post_id IS NULL AND target_comment_id IS NULL) OR
        (content_type = 'post'    AND target_post_id IS NOT NULL
                                  AND target_member_id IS NULL AND target_comment_id IS NULL) OR
        (content_type = 'comment' AND target_comment_id IS NOT NULL
                                  AND target_member_id IS NULL AND target_post_id IS NULL)
    )
);

CREATE TABLE IF NOT EXISTS appeals (
    id                   TEXT PRIMARY KEY,
    moderation_action_id TEXT NOT NULL REFERENCES moderation_actions(id),
    appellant_id         TEXT NOT NULL REFERENCES members(id),
    reason               TEXT NOT NULL,
    status               TEXT NOT NULL CHECK (status IN ('pending', 'accepted', 'rejected')),
    reviewed_by          TEXT REFERENCES members(id),
    decision_note        TEXT,
    created_at           TEXT NOT NULL,
    updated_at           TEXT NOT NULL,
    deleted_at           TEXT
);

CREATE TABLE IF NOT EXISTS attachments (
    id          TEXT PRIMARY KEY,
    post_id     TEXT NOT NULL REFERENCES posts(id),
    comment_id  TEXT REFERENCES comments(id),
    uploader_id TEXT NOT NULL REFERENCES members(id),
    file_name   TEXT NOT NULL,
    media_type  TEXT NOT NULL,
    url         TEXT NOT NULL,
    size_bytes  INTEGER NOT NULL CHECK (size_bytes >= 0),
    created_at  TEXT NOT NULL,
    updated_at  TEXT NOT NULL,
    deleted_at  TEXT
);

CREATE TABLE IF NOT EXISTS notification_channels (
    id           TEXT PRIMARY KEY,
    member_id    TEXT NOT NULL REFERENCES members(id),
    channel_type TEXT NOT NULL CHECK (channel_type IN ('email', 'app_push', 'sms')),
    destination  TEXT,
    is_enabled   INTEGER NOT NULL CHECK (is_enabled IN (0, 1)),
    created_at   TEXT NOT NULL,
    updated_at   TEXT NOT NULL,
    deleted_at   TEXT
);

CREATE TABLE IF NOT EXISTS deletion_logs (
    id         TEXT PRIMARY KEY,
    post_id    TEXT NOT NULL REFERENCES posts(id),
    comment_id TEXT NOT NULL REFERENCES comments(id),
    actor_id   TEXT NOT NULL REFERENCES members(id),
    reason     TEXT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    deleted_at TEXT
);

CREATE UNIQUE INDEX IF NOT EXISTS members_email_key
    ON members(email) WHERE deleted_at IS NULL;

CREATE UNIQUE INDEX IF NOT EXISTS notification_channels_member_type_key
    ON notification_channels(member_id, channel_type) WHERE deleted_at IS NULL;

CREATE UNIQUE INDEX IF NOT EXISTS appeals_action_appellant_key
    ON appeals(moderation_action_id, appellant_id) WHERE deleted_at IS NULL;

CREATE UNIQUE INDEX IF NOT EXISTS reports_reporter_target_key
    ON reports(
        reporter_id,
        content_type,
        COALESCE(reported_post_id, ''),
        COALESCE(reported_comment_id, '')
    ) WHERE deleted_at IS NULL;

CREATE INDEX IF NOT EXISTS posts_author_idx         ON posts(author_id);
CREATE INDEX IF NOT EXISTS comments_post_idx        ON comments(post_id);
CREATE INDEX IF NOT EXISTS attachments_post_idx     ON attachments(post_id);
CREATE INDEX IF NOT EXISTS deletion_logs_comment_idx ON deletion_logs(comment_id);
CREATE INDEX IF NOT EXISTS reports_status_idx       ON reports(status);
";
