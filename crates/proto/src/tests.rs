use crate::consts::{DMDIR, NOFID, NOTAG, QID_TYPE_DIR};

use super::*;
use bytes::BytesMut;
use futures::StreamExt;
use tokio_util::codec::{Decoder, Encoder, FramedRead};

fn server_decoder() -> FrameDecoder {
    FrameDecoder::new(DecoderConfig::new(Role::Server))
}

fn client_decoder() -> FrameDecoder {
    FrameDecoder::new(DecoderConfig::new(Role::Client))
}

fn sample_stat() -> DirEntry {
    DirEntry {
        r#type: 0,
        dev: 0,
        qid: Qid::new(0x00, 0, 0x789_u64),
        mode: 0o644,
        atime: 1_000_000,
        mtime: 1_000_001,
        length: ULong::from(1024),
        name: "résumé.txt".to_string(),
        uid: "user".to_string(),
        gid: "группа".to_string(),
        muid: "user".to_string(),
    }
}

fn requests() -> Vec<TaggedMessage> {
    vec![
        TaggedMessage::new(
            NOTAG,
            Message::Tversion(Tversion {
                msize: 8192,
                version: "9P2000".to_string(),
            }),
        ),
        TaggedMessage::new(
            3,
            Message::Tauth(Tauth {
                afid: 42,
                uname: "user".to_string(),
                aname: String::new(),
            }),
        ),
        TaggedMessage::new(
            5,
            Message::Tattach(Tattach {
                fid: 1,
                afid: NOFID,
                uname: "alice".to_string(),
                aname: String::new(),
            }),
        ),
        TaggedMessage::new(7, Message::Tflush(Tflush { oldtag: 5 })),
        TaggedMessage::new(
            9,
            Message::Twalk(Twalk {
                fid: 1,
                newfid: 2,
                wnames: vec!["usr".to_string(), "lib".to_string()],
            }),
        ),
        TaggedMessage::new(
            10,
            Message::Twalk(Twalk {
                fid: 1,
                newfid: 1,
                wnames: vec![],
            }),
        ),
        TaggedMessage::new(11, Message::Topen(Topen { fid: 2, mode: 0 })),
        TaggedMessage::new(
            13,
            Message::Tcreate(Tcreate {
                fid: 2,
                name: "new.txt".to_string(),
                perm: 0o644,
                mode: 1,
            }),
        ),
        TaggedMessage::new(
            15,
            Message::Tread(Tread {
                fid: 2,
                offset: ULong::from(1 << 40),
                count: 4096,
            }),
        ),
        TaggedMessage::new(
            17,
            Message::Twrite(Twrite {
                fid: 2,
                offset: ULong::MAX,
                data: Bytes::from_static(b"hello world"),
            }),
        ),
        TaggedMessage::new(
            18,
            Message::Twrite(Twrite {
                fid: 2,
                offset: ULong::ZERO,
                data: Bytes::new(),
            }),
        ),
        TaggedMessage::new(19, Message::Tclunk(Tclunk { fid: 2 })),
        TaggedMessage::new(21, Message::Tremove(Tremove { fid: 3 })),
        TaggedMessage::new(23, Message::Tstat(Tstat { fid: 1 })),
        TaggedMessage::new(
            25,
            Message::Twstat(Twstat {
                fid: 1,
                stat: sample_stat(),
            }),
        ),
    ]
}

fn replies() -> Vec<TaggedMessage> {
    vec![
        TaggedMessage::new(
            NOTAG,
            Message::Rversion(Rversion {
                msize: 8192,
                version: "9P2000".to_string(),
            }),
        ),
        TaggedMessage::new(
            4,
            Message::Rauth(Rauth {
                aqid: Qid::new(crate::consts::QID_TYPE_AUTH, 0, 1_u64),
            }),
        ),
        TaggedMessage::new(
            6,
            Message::Rattach(Rattach {
                qid: Qid::new(QID_TYPE_DIR, 0, 0x123_u64),
            }),
        ),
        TaggedMessage::new(8, Message::error("file not found")),
        TaggedMessage::new(8, Message::error("")),
        TaggedMessage::new(9, Message::Rflush(Rflush)),
        TaggedMessage::new(
            10,
            Message::Rwalk(Rwalk {
                wqids: vec![
                    Qid::new(QID_TYPE_DIR, 0, 0x456_u64),
                    Qid::new(0, 3, 0x789_u64),
                ],
            }),
        ),
        TaggedMessage::new(
            12,
            Message::Ropen(Ropen {
                qid: Qid::new(0, 0, 0x789_u64),
                iounit: 8168,
            }),
        ),
        TaggedMessage::new(
            14,
            Message::Rcreate(Rcreate {
                qid: Qid::new(0, 0, 0x790_u64),
                iounit: 0,
            }),
        ),
        TaggedMessage::new(
            16,
            Message::Rread(Rread {
                data: Bytes::from_static(&[0, 1, 2, 0xFF]),
            }),
        ),
        TaggedMessage::new(18, Message::Rwrite(Rwrite { count: 11 })),
        TaggedMessage::new(20, Message::Rclunk(Rclunk)),
        TaggedMessage::new(22, Message::Rremove(Rremove)),
        TaggedMessage::new(
            24,
            Message::Rstat(Rstat {
                stat: sample_stat(),
            }),
        ),
        TaggedMessage::new(26, Message::Rwstat(Rwstat)),
    ]
}

fn encode_all(messages: &[TaggedMessage]) -> Vec<u8> {
    messages
        .iter()
        .flat_map(|m| encode_message(m).unwrap().to_vec())
        .collect()
}

#[test]
fn test_round_trip_all_requests() {
    for original in requests() {
        let bytes = encode_message(&original).unwrap();
        assert_eq!(bytes.len(), original.encoded_len());

        let decoded = server_decoder().decode_all(&bytes).unwrap();
        assert_eq!(decoded, vec![original.clone()], "{original}");
    }
}

#[test]
fn test_round_trip_all_replies() {
    for original in replies() {
        let bytes = encode_message(&original).unwrap();
        let decoded = client_decoder().decode_all(&bytes).unwrap();
        assert_eq!(decoded, vec![original.clone()], "{original}");
    }
}

#[test]
fn test_every_type_is_covered() {
    let mut seen: Vec<u8> = requests()
        .iter()
        .chain(replies().iter())
        .map(|m| m.message_type().to_u8())
        .collect();
    seen.sort_unstable();
    seen.dedup();
    let expected: Vec<u8> = (100..=127).filter(|code| *code != 106).collect();
    assert_eq!(seen, expected);
}

#[test]
fn test_header_layout() {
    let message = TaggedMessage::new(0x0102, Message::Tclunk(Tclunk { fid: 0xAABB_CCDD }));
    let bytes = encode_message(&message).unwrap();
    assert_eq!(
        bytes.as_ref(),
        &[11, 0, 0, 0, 120, 0x02, 0x01, 0xDD, 0xCC, 0xBB, 0xAA]
    );
}

#[test]
fn test_encoding_is_deterministic() {
    for message in requests().iter().chain(replies().iter()) {
        assert_eq!(
            encode_message(message).unwrap(),
            encode_message(message).unwrap()
        );
    }
}

#[test]
fn test_empty_body_messages() {
    let message = TaggedMessage::new(1, Message::Rclunk(Rclunk));
    let bytes = encode_message(&message).unwrap();
    assert_eq!(bytes.len(), 7);

    let mut decoder = client_decoder();
    let decoded = decoder.decode_all(&bytes).unwrap();
    assert_eq!(decoded, vec![message]);
    assert!(decoder.is_idle());
}

#[test]
fn test_tattach_length() {
    let message = TaggedMessage::new(
        1,
        Message::Tattach(Tattach {
            fid: 1,
            afid: NOFID,
            uname: "alice".to_string(),
            aname: String::new(),
        }),
    );
    assert_eq!(message.encoded_len(), 24);

    let bytes = encode_message(&message).unwrap();
    assert_eq!(bytes.len(), 24);
    assert_eq!(&bytes[..4], &24u32.to_le_bytes());
}

#[test]
fn test_tattach_scenario() {
    let bytes = encode_message(&TaggedMessage::new(
        1,
        Message::Tattach(Tattach {
            fid: 1,
            afid: NOFID,
            uname: "alice".to_string(),
            aname: String::new(),
        }),
    ))
    .unwrap();

    let decoded = server_decoder().decode_all(&bytes).unwrap();
    assert_eq!(decoded.len(), 1);
    let Message::Tattach(attach) = &decoded[0].message else {
        panic!("expected Tattach, got {}", decoded[0]);
    };
    assert_eq!(attach.fid, 1);
    assert_eq!(attach.afid, 0xFFFF_FFFF);
    assert_eq!(attach.uname, "alice");
    assert_eq!(attach.aname, "");
}

#[test]
fn test_byte_at_a_time() {
    for original in requests() {
        let bytes = encode_message(&original).unwrap();
        let mut decoder = server_decoder();
        let mut decoded = Vec::new();

        for (i, byte) in bytes.iter().enumerate() {
            let emitted = decoder
                .feed(std::slice::from_ref(byte), |m| decoded.push(m))
                .unwrap();
            if i + 1 < bytes.len() {
                assert_eq!(emitted, 0);
                assert_eq!(decoder.buffered(), i + 1);
            }
        }

        assert_eq!(decoded, vec![original]);
        assert!(decoder.is_idle());
    }
}

#[test]
fn test_every_split_point() {
    let stream = encode_all(&replies());
    let expected = replies();

    for split in 0..=stream.len() {
        let mut decoder = client_decoder();
        let mut decoded = decoder.decode_all(&stream[..split]).unwrap();
        decoded.extend(decoder.decode_all(&stream[split..]).unwrap());
        assert_eq!(decoded, expected, "split at {split}");
        assert!(decoder.is_idle());
    }
}

#[test]
fn test_uneven_chunks() {
    let stream = encode_all(&requests());
    let sizes = [3, 1, 7, 2, 13, 5, 64, 1, 1, 9];

    let mut decoder = server_decoder();
    let mut decoded = Vec::new();
    let mut rest = &stream[..];
    let mut i = 0;
    while !rest.is_empty() {
        let take = sizes[i % sizes.len()].min(rest.len());
        decoded.extend(decoder.decode_all(&rest[..take]).unwrap());
        rest = &rest[take..];
        i += 1;
    }

    assert_eq!(decoded, requests());
}

#[test]
fn test_many_messages_in_one_chunk() {
    let messages = requests();
    let stream = encode_all(&messages);

    let mut decoder = server_decoder();
    let mut order = Vec::new();
    let emitted = decoder.feed(&stream, |m| order.push(m)).unwrap();

    assert_eq!(emitted, messages.len());
    assert_eq!(order, messages);
}

#[test]
fn test_empty_chunk() {
    let mut decoder = server_decoder();
    assert_eq!(decoder.feed(&[], |_| panic!("nothing to emit")).unwrap(), 0);
    assert!(decoder.is_idle());
}

#[test]
fn test_server_rejects_reply_code() {
    let bytes = encode_message(&TaggedMessage::new(1, Message::Rclunk(Rclunk))).unwrap();
    let mut bytes = bytes.to_vec();
    bytes[4] = 101;

    let err = server_decoder().decode_all(&bytes).unwrap_err();
    assert!(matches!(
        err,
        error::Error::InvalidMessageType {
            code: 101,
            role: Role::Server
        }
    ));
}

#[test]
fn test_client_rejects_request_code() {
    let bytes = encode_message(&TaggedMessage::new(
        NOTAG,
        Message::Tversion(Tversion {
            msize: 8192,
            version: "9P2000".to_string(),
        }),
    ))
    .unwrap();

    let err = client_decoder().decode_all(&bytes).unwrap_err();
    assert!(err.is_protocol_violation());
    assert!(err.to_string().contains("100"));
}

#[test]
fn test_terror_rejected_by_both_roles() {
    let header = [7, 0, 0, 0, 106, 1, 0];
    assert!(server_decoder()
        .decode_all(&header)
        .unwrap_err()
        .is_protocol_violation());
    assert!(client_decoder()
        .decode_all(&header)
        .unwrap_err()
        .is_protocol_violation());
}

#[test]
fn test_short_length_rejected() {
    for length in 0u32..7 {
        let mut header = length.to_le_bytes().to_vec();
        header.extend_from_slice(&[120, 1, 0]);
        let err = server_decoder().decode_all(&header).unwrap_err();
        assert!(
            matches!(err, error::Error::ProtocolViolation(_)),
            "length {length}: {err}"
        );
    }
}

#[test]
fn test_oversized_length_rejected() {
    let config = DecoderConfig::new(Role::Server)
        .with_max_message_size(64)
        .unwrap();
    let mut decoder = FrameDecoder::new(config);

    let mut header = 65u32.to_le_bytes().to_vec();
    header.extend_from_slice(&[118, 1, 0]);
    let err = decoder.decode_all(&header).unwrap_err();
    assert!(err.is_protocol_violation());
    assert!(decoder.is_failed());

    let mut decoder = FrameDecoder::new(config);
    let ok = encode_message(&TaggedMessage::new(
        1,
        Message::Twrite(Twrite {
            fid: 1,
            offset: ULong::ZERO,
            data: Bytes::from(vec![7u8; 64 - 23]),
        }),
    ))
    .unwrap();
    assert_eq!(ok.len(), 64);
    assert_eq!(decoder.decode_all(&ok).unwrap().len(), 1);
}

#[test]
fn test_huge_length_rejected_with_default_config() {
    let header = [0xFF, 0xFF, 0xFF, 0xFF, 100, 0xFF, 0xFF];
    let err = server_decoder().decode_all(&header).unwrap_err();
    assert!(err.is_protocol_violation());
}

#[test]
fn test_invalid_max_message_size() {
    assert!(DecoderConfig::new(Role::Client)
        .with_max_message_size(6)
        .is_err());
    assert!(DecoderConfig::new(Role::Client)
        .with_max_message_size(u32::MAX)
        .is_err());
    assert_eq!(
        DecoderConfig::new(Role::Client)
            .with_max_message_size(7)
            .unwrap()
            .max_message_size(),
        7
    );
}

#[test]
fn test_violation_terminates_stream() {
    let good = encode_message(&TaggedMessage::new(1, Message::Tclunk(Tclunk { fid: 1 }))).unwrap();
    let mut stream = good.to_vec();
    stream.extend_from_slice(&[3, 0, 0, 0, 120, 1, 0]);
    stream.extend_from_slice(&good);

    let mut decoder = server_decoder();
    let mut decoded = Vec::new();
    let err = decoder.feed(&stream, |m| decoded.push(m)).unwrap_err();
    assert!(err.is_protocol_violation());
    // the message before the bad header was still delivered
    assert_eq!(decoded.len(), 1);

    assert!(matches!(
        decoder.decode_all(&good),
        Err(error::Error::StreamTerminated)
    ));

    decoder.reset();
    assert_eq!(decoder.decode_all(&good).unwrap().len(), 1);
}

#[test]
fn test_body_shorter_than_fields() {
    // Tattach declaring a 9-byte body: fid and afid fit, uname does not
    let mut bytes = vec![16, 0, 0, 0, 104, 1, 0];
    bytes.extend_from_slice(&1u32.to_le_bytes());
    bytes.extend_from_slice(&NOFID.to_le_bytes());
    bytes.push(0);

    let err = server_decoder().decode_all(&bytes).unwrap_err();
    assert!(matches!(err, error::Error::ProtocolViolation(_)), "{err}");
}

#[test]
fn test_trailing_body_bytes() {
    let mut bytes = vec![12, 0, 0, 0, 120, 1, 0];
    bytes.extend_from_slice(&9u32.to_le_bytes());
    bytes.push(0xEE);

    let err = server_decoder().decode_all(&bytes).unwrap_err();
    assert!(err.to_string().contains("trailing"), "{err}");
}

#[test]
fn test_stat_count_mismatch() {
    let message = TaggedMessage::new(
        1,
        Message::Rstat(Rstat {
            stat: sample_stat(),
        }),
    );
    let mut bytes = encode_message(&message).unwrap().to_vec();
    bytes[7] = bytes[7].wrapping_add(1);

    let err = client_decoder().decode_all(&bytes).unwrap_err();
    assert!(err.is_protocol_violation());
}

#[test]
fn test_rstat_carries_double_size() {
    let stat = sample_stat();
    let size = stat.size();
    let bytes = encode_message(&TaggedMessage::new(1, Message::Rstat(Rstat { stat }))).unwrap();

    assert_eq!(bytes.len(), 7 + 2 + size);
    let n = u16::from_le_bytes([bytes[7], bytes[8]]) as usize;
    let inner = u16::from_le_bytes([bytes[9], bytes[10]]) as usize;
    assert_eq!(n, size);
    assert_eq!(inner, size - 2);
}

#[test]
fn test_walk_element_limit() {
    let wnames: Vec<String> = (0..17).map(|i| format!("d{i}")).collect();
    let message = TaggedMessage::new(
        1,
        Message::Twalk(Twalk {
            fid: 1,
            newfid: 2,
            wnames,
        }),
    );
    assert!(matches!(
        encode_message(&message),
        Err(error::Error::TooManyElements(17))
    ));
}

#[test]
fn test_string_too_long() {
    let message = TaggedMessage::new(1, Message::error("x".repeat(70_000)));
    assert!(matches!(
        encode_message(&message),
        Err(error::Error::StringTooLong(70_000))
    ));
}

#[test]
fn test_finish_mid_message() {
    let bytes = encode_message(&TaggedMessage::new(1, Message::Tstat(Tstat { fid: 4 }))).unwrap();

    let mut decoder = server_decoder();
    decoder.decode_all(&bytes[..9]).unwrap();
    let err = decoder.finish().unwrap_err();
    assert!(err.is_transport());
    // reported once
    assert!(decoder.finish().is_ok());

    let mut decoder = server_decoder();
    decoder.decode_all(&bytes).unwrap();
    assert!(decoder.finish().is_ok());
}

#[test]
fn test_codec_integration() {
    let mut server = MessageCodec::new(Role::Server);
    let original = TaggedMessage::new(
        42,
        Message::Tversion(Tversion {
            msize: 8192,
            version: "9P2000".to_string(),
        }),
    );

    let mut buf = BytesMut::new();
    server.encode(original.clone(), &mut buf).unwrap();

    let decoded = server.decode(&mut buf).unwrap().unwrap();
    assert_eq!(decoded, original);
    assert!(buf.is_empty());
    assert!(server.decode(&mut buf).unwrap().is_none());
}

#[test]
fn test_codec_queues_messages_from_one_read() {
    let mut codec = MessageCodec::new(Role::Client);
    let mut buf = BytesMut::from(&encode_all(&replies())[..]);

    let mut decoded = Vec::new();
    while let Some(message) = codec.decode(&mut buf).unwrap() {
        decoded.push(message);
    }
    assert_eq!(decoded, replies());
}

#[test]
fn test_codec_rejects_oversized_outbound() {
    let config = DecoderConfig::new(Role::Client)
        .with_max_message_size(32)
        .unwrap();
    let mut codec = MessageCodec::with_config(config);
    let message = TaggedMessage::new(
        1,
        Message::Twrite(Twrite {
            fid: 1,
            offset: ULong::ZERO,
            data: Bytes::from(vec![0u8; 64]),
        }),
    );

    let mut buf = BytesMut::new();
    assert!(matches!(
        codec.encode(message, &mut buf),
        Err(error::Error::MessageTooLarge { size: 87, max: 32 })
    ));
    assert!(buf.is_empty());
}

#[tokio::test]
async fn test_framed_read_over_split_reads() {
    let stream = encode_all(&requests());
    let mut mock = tokio_test::io::Builder::new();
    for chunk in stream.chunks(5) {
        mock.read(chunk);
    }

    let mut framed = FramedRead::new(mock.build(), MessageCodec::new(Role::Server));
    let mut decoded = Vec::new();
    while let Some(message) = framed.next().await {
        decoded.push(message.unwrap());
    }
    assert_eq!(decoded, requests());
}

#[tokio::test]
async fn test_framed_read_eof_mid_message() {
    let bytes = encode_message(&TaggedMessage::new(1, Message::Tclunk(Tclunk { fid: 1 }))).unwrap();
    let mock = tokio_test::io::Builder::new()
        .read(&bytes)
        .read(&bytes[..5])
        .build();

    let mut framed = FramedRead::new(mock, MessageCodec::new(Role::Server));
    assert!(framed.next().await.unwrap().is_ok());
    let err = framed.next().await.unwrap().unwrap_err();
    assert!(err.is_transport());
}

#[test]
fn test_display_trace_format() {
    let message = TaggedMessage::new(
        1,
        Message::Tattach(Tattach {
            fid: 1,
            afid: NOFID,
            uname: "alice".to_string(),
            aname: String::new(),
        }),
    );
    assert_eq!(
        message.to_string(),
        "Tattach tag 1 fid 1 afid -1 uname alice aname"
    );

    let version = TaggedMessage::new(
        NOTAG,
        Message::Tversion(Tversion {
            msize: 8192,
            version: "9P2000".to_string(),
        }),
    );
    assert_eq!(
        version.to_string(),
        "Tversion tag -1 msize 8192 version '9P2000'"
    );

    let clunk = TaggedMessage::new(3, Message::Rclunk(Rclunk));
    assert_eq!(clunk.to_string(), "Rclunk tag 3");

    let read = TaggedMessage::new(
        4,
        Message::Rread(Rread {
            data: Bytes::from_static(&[0xDE, 0xAD, 0xBE, 0xEF]),
        }),
    );
    assert_eq!(read.to_string(), "Rread tag 4 count 4 deadbeef");
}

#[test]
fn test_display_stat() {
    let stat = DirEntry {
        qid: Qid::new(QID_TYPE_DIR, 2, 0x10_u64),
        mode: DMDIR | 0o750,
        name: "lib".to_string(),
        uid: "glenda".to_string(),
        gid: "sys".to_string(),
        muid: "glenda".to_string(),
        ..DirEntry::default()
    };
    assert_eq!(
        stat.to_string(),
        "stat 'lib' 'glenda' 'sys' 'glenda' q (0000000000000010 2 d) m drwxr-x--- at 0 mt 0 l 0 t 0 d 0"
    );
}
