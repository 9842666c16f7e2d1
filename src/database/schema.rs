//! Idempotent DDL applied by `devcamp migrate`.

pub const STATEMENTS: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS users (
        id UUID PRIMARY KEY,
        name TEXT NOT NULL,
        email TEXT NOT NULL UNIQUE,
        role TEXT NOT NULL DEFAULT 'user' CHECK (role IN ('user', 'publisher', 'admin')),
        password_hash TEXT NOT NULL,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS bootcamps (
        id UUID PRIMARY KEY,
        user_id UUID NOT NULL,
        name TEXT NOT NULL UNIQUE,
        slug TEXT NOT NULL,
        description TEXT NOT NULL,
        website TEXT,
        phone TEXT,
        email TEXT,
        longitude DOUBLE PRECISION NOT NULL,
        latitude DOUBLE PRECISION NOT NULL,
        formatted_address TEXT,
        street TEXT,
        city TEXT,
        state TEXT,
        zipcode TEXT,
        country TEXT,
        careers TEXT[] NOT NULL DEFAULT '{}',
        average_rating DOUBLE PRECISION,
        average_cost INTEGER,
        photo TEXT NOT NULL DEFAULT 'no-photo.jpg',
        housing BOOLEAN NOT NULL DEFAULT FALSE,
        job_assistance BOOLEAN NOT NULL DEFAULT FALSE,
        job_guarantee BOOLEAN NOT NULL DEFAULT FALSE,
        accept_gi BOOLEAN NOT NULL DEFAULT FALSE,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now()
    )
    "#,
    "CREATE INDEX IF NOT EXISTS bootcamps_user_id_idx ON bootcamps (user_id)",
    r#"
    CREATE TABLE IF NOT EXISTS reviews (
        id UUID PRIMARY KEY,
        title TEXT NOT NULL,
        text TEXT NOT NULL,
        rating INTEGER NOT NULL CHECK (rating BETWEEN 1 AND 10),
        bootcamp_id UUID NOT NULL REFERENCES bootcamps(id) ON DELETE CASCADE,
        user_id UUID NOT NULL,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
        UNIQUE (bootcamp_id, user_id)
    )
    "#,
];
