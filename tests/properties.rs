use std::cmp::Reverse;
use std::collections::BinaryHeap;

use proptest::prelude::*;
use static_huffman::bit_packer::{self, Bits};
use static_huffman::{FrequencyTable, HuffmanCodec, HuffmanTree};

/// Minimum Σ count × length over all binary prefix codes: the sum of every
/// merge weight. A one-symbol alphabet still pays one bit per symbol.
fn optimal_cost(frequencies: &FrequencyTable) -> usize {
    if frequencies.len() == 1 {
        return frequencies.total();
    }
    let mut heap: BinaryHeap<Reverse<usize>> =
        frequencies.iter().map(|(_, count)| Reverse(count)).collect();
    let mut cost = 0;
    while heap.len() > 1 {
        let Reverse(a) = heap.pop().unwrap();
        let Reverse(b) = heap.pop().unwrap();
        cost += a + b;
        heap.push(Reverse(a + b));
    }
    cost
}

fn small_alphabet_text() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(prop::sample::select(b"abcdefg \n".to_vec()), 1..400)
}

proptest! {
    #[test]
    fn codes_are_prefix_free(data in prop::collection::vec(any::<u8>(), 1..600)) {
        let table = HuffmanTree::from_bytes(&data).unwrap().generate_table();
        prop_assert!(table.is_prefix_free());
        prop_assert_eq!(table.len(), FrequencyTable::from_bytes(&data).len());
    }

    #[test]
    fn weighted_length_is_optimal(data in small_alphabet_text()) {
        let frequencies = FrequencyTable::from_bytes(&data);
        let table = HuffmanTree::from_frequencies(&frequencies).unwrap().generate_table();
        prop_assert_eq!(table.weighted_length(&frequencies).unwrap(), optimal_cost(&frequencies));
    }

    #[test]
    fn compress_then_decode_is_identity(data in prop::collection::vec(any::<u8>(), 1..600)) {
        let codec = HuffmanCodec::from_bytes(&data).unwrap();
        let compressed = codec.compress(&data).unwrap();
        prop_assert_eq!(HuffmanCodec::decode(&compressed).unwrap(), data);
    }

    #[test]
    fn packing_keeps_final_group_unpadded(bits in prop::collection::vec(any::<bool>(), 0..100)) {
        let bits: Bits = bits.into_iter().collect();
        let packed = bit_packer::pack(&bits);

        prop_assert_eq!(packed.len(), bits.len().div_ceil(8));
        let tail = bits.len() % 8;
        if tail != 0 {
            prop_assert!(u32::from(*packed.last().unwrap()) < 1u32 << tail);
        }
        prop_assert_eq!(bit_packer::unpack(&packed, bits.len()).unwrap(), bits);
    }
}

#[test]
fn more_frequent_symbols_get_shorter_codes() {
    let table = HuffmanTree::from_bytes(b"aaabbc").unwrap().generate_table();
    let len = |s: u8| table.get(s).unwrap().len();
    assert!(len(b'a') <= len(b'b'));
    assert!(len(b'b') <= len(b'c'));
}

#[test]
fn skewed_distribution_exceeds_word_sized_codes() {
    // Fibonacci weights give a maximally deep tree.
    let mut frequencies = FrequencyTable::new();
    let (mut a, mut b) = (1usize, 1usize);
    for symbol in 0..40u8 {
        frequencies.add(symbol, a);
        (a, b) = (b, a + b);
    }
    let codec = HuffmanCodec::from_frequencies(&frequencies).unwrap();
    let longest = codec.code_table().iter().map(|(_, c)| c.len()).max().unwrap();
    assert_eq!(longest, 39);

    let text: Vec<u8> = (0..40u8).collect();
    let bits = codec.encode(&text).unwrap();
    assert_eq!(codec.decode_bits(&bits, text.len()).unwrap(), text);
}
