// ── Domain model ──
//
// Records arrive from the server as schemaless JSON objects. The core
// keeps them dynamic and lets the resource catalogue name the fields
// each screen searches, filters, and sorts on.

mod record;

pub use record::Record;
