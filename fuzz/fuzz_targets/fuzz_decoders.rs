#![no_main]

use libfuzzer_sys::fuzz_target;
use emit_rs::{Emit250Decoder, EscanDecoder, Mtr4Decoder};

fuzz_target!(|data: &[u8]| {
    // First byte picks the chunk size so seams land everywhere
    let Some((&split, stream)) = data.split_first() else {
        return;
    };
    let size = usize::from(split).max(1);

    let mut emit250 = Emit250Decoder::emit250(true);
    let mut mtr4 = Mtr4Decoder::mtr4();
    let mut escan = EscanDecoder::escan();

    for chunk in stream.chunks(size) {
        emit250.add_chunk(chunk);
        mtr4.add_chunk(chunk);
        escan.add_chunk(chunk);
        emit250.records().for_each(drop);
        mtr4.records().for_each(drop);
        escan.records().for_each(drop);
    }

    // Chunking must not change what is decoded
    let mut whole = Mtr4Decoder::mtr4();
    whole.add_chunk(stream);
    assert_eq!(whole.stats().records_emitted, mtr4.stats().records_emitted);
});
