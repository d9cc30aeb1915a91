//! Initial database migration.
//!
//! Creates the enums, tables, indexes and the `updated_at` trigger.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        // ============================================================
        // PART 1: ENUMS
        // ============================================================
        db.execute_unprepared(ENUMS_SQL).await?;

        // ============================================================
        // PART 2: TENANTS
        // ============================================================
        db.execute_unprepared(PARTNERS_SQL).await?;
        db.execute_unprepared(SUBSCRIPTION_HISTORIES_SQL).await?;

        // ============================================================
        // PART 3: TRIPS & BOOKINGS
        // ============================================================
        db.execute_unprepared(TRIPS_SQL).await?;
        db.execute_unprepared(BOOKINGS_SQL).await?;
        db.execute_unprepared(CUSTOMERS_SQL).await?;
        db.execute_unprepared(PAYMENTS_SQL).await?;

        // ============================================================
        // PART 4: EXPENSES & ENQUIRIES
        // ============================================================
        db.execute_unprepared(EXPENSES_SQL).await?;
        db.execute_unprepared(ENQUIRIES_SQL).await?;

        // ============================================================
        // PART 5: SETTINGS
        // ============================================================
        db.execute_unprepared(SYSTEM_SETTINGS_SQL).await?;

        // ============================================================
        // PART 6: TRIGGERS
        // ============================================================
        db.execute_unprepared(TRIGGERS_SQL).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(DROP_ALL_SQL).await?;
        Ok(())
    }
}

// ============================================================
// SQL CONSTANTS
// ============================================================

const ENUMS_SQL: &str = r"
CREATE TYPE partner_status AS ENUM ('active', 'inactive', 'blocked');
CREATE TYPE plan_type AS ENUM ('free', 'pro');
CREATE TYPE trip_type AS ENUM ('package', 'camp');
CREATE TYPE trip_status AS ENUM ('active', 'inactive');
CREATE TYPE booking_status AS ENUM ('pending', 'confirmed', 'cancelled', 'partial_cancelled');
CREATE TYPE member_status AS ENUM ('active', 'cancelled');
CREATE TYPE gender AS ENUM ('male', 'female', 'other');
CREATE TYPE payment_type AS ENUM ('full', 'advance', 'custom', 'balance', 'refund');
CREATE TYPE payment_status AS ENUM ('pending', 'completed', 'failed');
CREATE TYPE expense_category AS ENUM (
    'accommodation',
    'food',
    'transportation',
    'activities',
    'equipment',
    'permits',
    'guide_fees',
    'medical',
    'miscellaneous',
    'other'
);
CREATE TYPE enquiry_status AS ENUM ('hot', 'warm', 'cold', 'converted', 'cancelled');
";

const PARTNERS_SQL: &str = r"
CREATE TABLE partners (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    name VARCHAR(255) NOT NULL,
    email VARCHAR(255) NOT NULL,
    password_hash VARCHAR(255) NOT NULL,
    phone VARCHAR(20),
    otp VARCHAR(6),
    otp_expires_at TIMESTAMPTZ,
    is_verified BOOLEAN NOT NULL DEFAULT false,
    reset_password_token VARCHAR(64),
    reset_password_expires_at TIMESTAMPTZ,
    status partner_status NOT NULL DEFAULT 'active',
    plan plan_type NOT NULL DEFAULT 'free',
    subscription_expires_at TIMESTAMPTZ,
    is_whatsapp_enabled BOOLEAN NOT NULL DEFAULT false,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE UNIQUE INDEX idx_partners_email ON partners(LOWER(email));
CREATE INDEX idx_partners_reset_token ON partners(reset_password_token)
    WHERE reset_password_token IS NOT NULL;
";

const SUBSCRIPTION_HISTORIES_SQL: &str = r"
CREATE TABLE subscription_histories (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    partner_id UUID NOT NULL REFERENCES partners(id) ON DELETE CASCADE,
    plan plan_type NOT NULL,
    amount NUMERIC(12, 2) NOT NULL,
    currency VARCHAR(3) NOT NULL DEFAULT 'INR',
    order_id VARCHAR(64) NOT NULL,
    payment_id VARCHAR(64),
    signature VARCHAR(128),
    status payment_status NOT NULL DEFAULT 'pending',
    expiry_date TIMESTAMPTZ,
    metadata JSONB,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_subscription_histories_partner
    ON subscription_histories(partner_id, created_at DESC);
";

const TRIPS_SQL: &str = r"
CREATE TABLE trips (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    partner_id UUID NOT NULL REFERENCES partners(id) ON DELETE CASCADE,
    title VARCHAR(255) NOT NULL,
    description TEXT,
    price NUMERIC(12, 2) NOT NULL CHECK (price >= 0),
    destination VARCHAR(255),
    advance_amount NUMERIC(12, 2) NOT NULL DEFAULT 0 CHECK (advance_amount >= 0),
    trip_type trip_type NOT NULL DEFAULT 'package',
    start_date DATE,
    end_date DATE,
    capacity INTEGER CHECK (capacity IS NULL OR capacity > 0),
    group_size VARCHAR(50),
    category VARCHAR(100),
    status trip_status NOT NULL DEFAULT 'active',
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_trip_dates CHECK (end_date IS NULL OR start_date IS NULL OR end_date >= start_date)
);

CREATE INDEX idx_trips_partner ON trips(partner_id, created_at DESC);
";

const BOOKINGS_SQL: &str = r"
CREATE TABLE bookings (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    trip_id UUID NOT NULL REFERENCES trips(id) ON DELETE CASCADE,
    partner_id UUID NOT NULL REFERENCES partners(id) ON DELETE CASCADE,
    member_count INTEGER NOT NULL CHECK (member_count > 0),
    amount NUMERIC(12, 2) NOT NULL DEFAULT 0,
    total_package_price NUMERIC(12, 2),
    concession_amount NUMERIC(12, 2) NOT NULL DEFAULT 0 CHECK (concession_amount >= 0),
    preferred_date DATE,
    booking_date TIMESTAMPTZ NOT NULL DEFAULT now(),
    is_active BOOLEAN NOT NULL DEFAULT true,
    status booking_status NOT NULL DEFAULT 'pending',
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_bookings_partner ON bookings(partner_id, booking_date DESC);
CREATE INDEX idx_bookings_trip ON bookings(trip_id);
";

const CUSTOMERS_SQL: &str = r"
CREATE TABLE customers (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    booking_id UUID NOT NULL REFERENCES bookings(id) ON DELETE CASCADE,
    name VARCHAR(255) NOT NULL,
    gender gender NOT NULL,
    age INTEGER NOT NULL CHECK (age >= 0),
    contact_number VARCHAR(20),
    is_primary BOOLEAN NOT NULL DEFAULT false,
    place VARCHAR(255),
    status member_status NOT NULL DEFAULT 'active',
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_customers_booking ON customers(booking_id);
CREATE INDEX idx_customers_contact ON customers(contact_number);
";

const PAYMENTS_SQL: &str = r"
CREATE TABLE payments (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    booking_id UUID NOT NULL REFERENCES bookings(id) ON DELETE CASCADE,
    amount NUMERIC(12, 2) NOT NULL CHECK (amount >= 0),
    method VARCHAR(50),
    payment_type payment_type NOT NULL,
    status payment_status NOT NULL DEFAULT 'completed',
    transaction_id VARCHAR(255),
    payment_date TIMESTAMPTZ NOT NULL DEFAULT now(),
    screenshot_url TEXT,
    notes TEXT,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_payments_booking ON payments(booking_id, payment_date DESC);
";

const EXPENSES_SQL: &str = r"
CREATE TABLE expenses (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    trip_id UUID NOT NULL REFERENCES trips(id) ON DELETE CASCADE,
    category expense_category NOT NULL,
    description TEXT,
    amount NUMERIC(12, 2) NOT NULL CHECK (amount >= 0),
    date DATE NOT NULL,
    paid_by VARCHAR(255),
    notes TEXT,
    receipt_url TEXT,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_expenses_trip ON expenses(trip_id, date DESC);
";

const ENQUIRIES_SQL: &str = r"
CREATE TABLE enquiries (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    partner_id UUID NOT NULL REFERENCES partners(id) ON DELETE CASCADE,
    name VARCHAR(255) NOT NULL,
    phone VARCHAR(20),
    notes TEXT,
    status enquiry_status NOT NULL DEFAULT 'warm',
    follow_up_date DATE,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_enquiries_partner ON enquiries(partner_id, created_at DESC);
";

const SYSTEM_SETTINGS_SQL: &str = r"
CREATE TABLE system_settings (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    key VARCHAR(100) NOT NULL UNIQUE,
    value TEXT NOT NULL,
    description TEXT,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);
";

const TRIGGERS_SQL: &str = r"
CREATE OR REPLACE FUNCTION touch_updated_at()
RETURNS TRIGGER AS $$
BEGIN
    NEW.updated_at = now();
    RETURN NEW;
END;
$$ LANGUAGE plpgsql;

CREATE TRIGGER trg_partners_updated BEFORE UPDATE ON partners
    FOR EACH ROW EXECUTE FUNCTION touch_updated_at();
CREATE TRIGGER trg_trips_updated BEFORE UPDATE ON trips
    FOR EACH ROW EXECUTE FUNCTION touch_updated_at();
CREATE TRIGGER trg_bookings_updated BEFORE UPDATE ON bookings
    FOR EACH ROW EXECUTE FUNCTION touch_updated_at();
CREATE TRIGGER trg_customers_updated BEFORE UPDATE ON customers
    FOR EACH ROW EXECUTE FUNCTION touch_updated_at();
CREATE TRIGGER trg_payments_updated BEFORE UPDATE ON payments
    FOR EACH ROW EXECUTE FUNCTION touch_updated_at();
CREATE TRIGGER trg_expenses_updated BEFORE UPDATE ON expenses
    FOR EACH ROW EXECUTE FUNCTION touch_updated_at();
CREATE TRIGGER trg_enquiries_updated BEFORE UPDATE ON enquiries
    FOR EACH ROW EXECUTE FUNCTION touch_updated_at();
CREATE TRIGGER trg_subscription_histories_updated BEFORE UPDATE ON subscription_histories
    FOR EACH ROW EXECUTE FUNCTION touch_updated_at();
CREATE TRIGGER trg_system_settings_updated BEFORE UPDATE ON system_settings
    FOR EACH ROW EXECUTE FUNCTION touch_updated_at();
";

const DROP_ALL_SQL: &str = r"
-- Order matters due to foreign key constraints
DROP TABLE IF EXISTS system_settings CASCADE;
DROP TABLE IF EXISTS enquiries CASCADE;
DROP TABLE IF EXISTS expenses CASCADE;
DROP TABLE IF EXISTS payments CASCADE;
DROP TABLE IF EXISTS customers CASCADE;
DROP TABLE IF EXISTS bookings CASCADE;
DROP TABLE IF EXISTS trips CASCADE;
DROP TABLE IF EXISTS subscription_histories CASCADE;
DROP TABLE IF EXISTS partners CASCADE;

DROP FUNCTION IF EXISTS touch_updated_at();

DROP TYPE IF EXISTS enquiry_status;
DROP TYPE IF EXISTS expense_category;
DROP TYPE IF EXISTS payment_status;
DROP TYPE IF EXISTS payment_type;
DROP TYPE IF EXISTS gender;
DROP TYPE IF EXISTS member_status;
DROP TYPE IF EXISTS booking_status;
DROP TYPE IF EXISTS trip_status;
DROP TYPE IF EXISTS trip_type;
DROP TYPE IF EXISTS plan_type;
DROP TYPE IF EXISTS partner_status;
";
