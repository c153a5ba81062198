#[macro_use]
extern crate criterion;
use criterion::Criterion;
use milestone_crypto::merkle::MerkleTree;
use milestone_crypto::signed_file::{digest_content, render_signature, verify_signature};
use milestone_crypto::sponge::{standard_hash, Sha3};
use milestone_crypto::winternitz;

fn bench_standard_hash(c: &mut Criterion) {
    let message = vec![0x5au8; 1600];
    c.bench_function("standard hash of 1600 bytes", |b| {
        b.iter(|| standard_hash(&message))
    });
}

macro_rules! bench_verify {
    ($name:ident, $security:expr, $depth:expr) => {
        fn $name(c: &mut Criterion) {
            let keys: Vec<_> = (0..1u64 << $depth)
                .map(|i| {
                    let subseed = winternitz::subseed::<Sha3>(b"bench", i);
                    winternitz::key::<Sha3>(&subseed, $security).unwrap()
                })
                .collect();
            let addresses: Vec<_> = keys
                .iter()
                .map(|k| winternitz::key_address::<Sha3>(k).unwrap())
                .collect();
            let tree = MerkleTree::<Sha3>::build(&addresses).unwrap();

            let content = "milestone\n";
            let digest = digest_content::<Sha3, _>(content.as_bytes()).unwrap();
            let fragments = winternitz::sign::<Sha3>(&keys[1], &digest).unwrap();
            let signature = render_signature(&fragments, Some(&tree.path(1).unwrap()));
            let root = tree.root();

            c.bench_function(
                format!("Verify with security: {}, depth: {}", $security, $depth).as_str(),
                |b| {
                    b.iter(|| {
                        verify_signature::<Sha3, _>(
                            signature.as_bytes(),
                            &root,
                            $depth,
                            1,
                            $security,
                            &digest,
                        )
                        .unwrap()
                    })
                },
            );
        }
    };
}

bench_verify!(verify_security_1, 1, 4);
bench_verify!(verify_security_2, 2, 4);
bench_verify!(verify_security_3, 3, 4);

criterion_group!(
    verify_benches,
    bench_standard_hash,
    verify_security_1,
    verify_security_2,
    verify_security_3
);
criterion_main!(verify_benches);
