#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Attempt to deserialize arbitrary bytes as various BLN types.
    // The goal is to ensure deserialization never panics on malformed input.

    // Try deserializing as a Block (StoredBlock carries the sideband too)
    let _ = bincode::deserialize::<bln_ledger::Block>(data);
    let _ = bincode::deserialize::<bln_ledger::block::StoredBlock>(data);

    // Try deserializing as a BlockHash
    let _ = bincode::deserialize::<bln_types::BlockHash>(data);

    // Try deserializing as a TxHash
    let _ = bincode::deserialize::<bln_types::TxHash>(data);

    // Try deserializing as a Timestamp
    let _ = bincode::deserialize::<bln_types::Timestamp>(data);

    // Try deserializing as a Signature
    let _ = bincode::deserialize::<bln_types::Signature>(data);
});
