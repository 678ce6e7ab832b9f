//! Human-readable trace lines, in the style of `9p` debug output:
//! `Twalk tag 3 fid 1 newfid 2 nwname 1 0:usr`.
use crate::{
    consts::{NOFID, NOTAG},
    DirEntry, FileMode, Message, Qid, QidType, Rattach, Rauth, Rclunk, Rcreate, Rerror, Rflush,
    Ropen, Rread, Rremove, Rstat, Rversion, Rwalk, Rwrite, Rwstat, TaggedMessage, Tattach, Tauth,
    Tclunk, Tcreate, Tflush, Topen, Tread, Tremove, Tstat, Tversion, Twalk, Twrite, Twstat, ULong,
};
use flagset::FlagSet;
use std::fmt::{self, Display, Formatter};

const DATA_PREVIEW: usize = 64;

const QID_CHARS: [(QidType, char); 6] = [
    (QidType::Dir, 'd'),
    (QidType::Append, 'a'),
    (QidType::Exclusive, 'l'),
    (QidType::Mount, 'm'),
    (QidType::Auth, 'A'),
    (QidType::Tmp, 't'),
];

const PERM_CHARS: [(FileMode, char); 9] = [
    (FileMode::OwnerRead, 'r'),
    (FileMode::OwnerWrite, 'w'),
    (FileMode::OwnerExec, 'x'),
    (FileMode::GroupRead, 'r'),
    (FileMode::GroupWrite, 'w'),
    (FileMode::GroupExec, 'x'),
    (FileMode::OtherRead, 'r'),
    (FileMode::OtherWrite, 'w'),
    (FileMode::OtherExec, 'x'),
];

/// Sentinel-aware number: `NOFID`/`NOTAG`/`~0` print as `-1`.
struct Id<T>(T, T);

impl<T: Display + PartialEq> Display for Id<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if self.0 == self.1 {
            f.write_str("-1")
        } else {
            self.0.fmt(f)
        }
    }
}

fn fid(fid: u32) -> Id<u32> {
    Id(fid, NOFID)
}

fn tag(tag: u16) -> Id<u16> {
    Id(tag, NOTAG)
}

struct Perm(FlagSet<FileMode>);

impl Display for Perm {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let dir = if self.0.contains(FileMode::Dir) { 'd' } else { '-' };
        let rest: String = PERM_CHARS
            .iter()
            .map(|&(bit, c)| if self.0.contains(bit) { c } else { '-' })
            .collect();
        write!(f, "{dir}{rest}")
    }
}

/// Payload bytes: quoted when printable, otherwise grouped hex.
struct Data<'a>(&'a [u8]);

impl Display for Data<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let data = self.0;
        if data.is_empty() {
            return f.write_str("''");
        }
        if data
            .iter()
            .all(|b| b.is_ascii_graphic() || b.is_ascii_whitespace())
        {
            return write!(f, "'{}'", String::from_utf8_lossy(data));
        }

        let shown = &data[..data.len().min(DATA_PREVIEW)];
        for (i, group) in shown.chunks(8).enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            f.write_str(&hex::encode(group))?;
        }
        if data.len() > shown.len() {
            write!(f, " [+{} more bytes]", data.len() - shown.len())?;
        }
        Ok(())
    }
}

impl Display for ULong {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        self.value().fmt(f)
    }
}

impl Display for Qid {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let flags = self.flags();
        let mut chars: String = QID_CHARS
            .iter()
            .filter(|(bit, _)| flags.contains(*bit))
            .map(|&(_, c)| c)
            .collect();
        if chars.is_empty() {
            chars.push(' ');
        }
        write!(f, "{:016x} {} {chars}", self.path().value(), self.version())
    }
}

impl Display for DirEntry {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "stat '{}' '{}' '{}' '{}' q ({}) m {} at {} mt {} l ",
            self.name,
            self.uid,
            self.gid,
            self.muid,
            self.qid,
            Perm(self.mode_flags()),
            self.atime,
            self.mtime,
        )?;
        if self.length.is_max() {
            f.write_str("-1")?;
        } else {
            self.length.fmt(f)?;
        }
        write!(f, " t {} d {}", self.r#type, self.dev)
    }
}

/// Implements `Display` for each message body and generates the matching
/// dispatch on [`Message`].
macro_rules! message_display {
    ($($kind:ident($m:ident, $f:ident) $body:block)*) => {
        $(
            impl Display for $kind {
                fn fmt(&self, $f: &mut Formatter<'_>) -> fmt::Result {
                    let $m = self;
                    $body
                }
            }
        )*

        impl Message {
            fn fmt_body(&self, f: &mut Formatter<'_>) -> fmt::Result {
                match self {
                    $(Message::$kind(body) => body.fmt(f),)*
                }
            }
        }
    };
}

message_display! {
    Tversion(m, f) { write!(f, "msize {} version '{}'", m.msize, m.version) }
    Rversion(m, f) { write!(f, "msize {} version '{}'", m.msize, m.version) }
    Tauth(m, f) { write!(f, "afid {} uname {} aname {}", fid(m.afid), m.uname, m.aname) }
    Rauth(m, f) { write!(f, "qid ({})", m.aqid) }
    Tattach(m, f) {
        write!(f, "fid {} afid {} uname {} aname {}", m.fid, fid(m.afid), m.uname, m.aname)
    }
    Rattach(m, f) { write!(f, "qid ({})", m.qid) }
    Rerror(m, f) { write!(f, "ename {}", m.ename) }
    Tflush(m, f) { write!(f, "oldtag {}", tag(m.oldtag)) }
    Rflush(_m, _f) { Ok(()) }
    Twalk(m, f) {
        write!(f, "fid {} newfid {} nwname {}", m.fid, m.newfid, m.wnames.len())?;
        m.wnames
            .iter()
            .enumerate()
            .try_for_each(|(i, name)| write!(f, " {i}:{name}"))
    }
    Rwalk(m, f) {
        write!(f, "nwqid {}", m.wqids.len())?;
        m.wqids
            .iter()
            .enumerate()
            .try_for_each(|(i, qid)| write!(f, " {i}:({qid})"))
    }
    Topen(m, f) { write!(f, "fid {} mode {}", m.fid, m.mode) }
    Ropen(m, f) { write!(f, "qid ({}) iounit {}", m.qid, m.iounit) }
    Tcreate(m, f) {
        let perm = Perm(FlagSet::new_truncated(m.perm));
        write!(f, "fid {} name {} perm {perm} mode {}", m.fid, m.name, m.mode)
    }
    Rcreate(m, f) { write!(f, "qid ({}) iounit {}", m.qid, m.iounit) }
    Tread(m, f) { write!(f, "fid {} offset {} count {}", m.fid, m.offset, m.count) }
    Rread(m, f) { write!(f, "count {} {}", m.data.len(), Data(&m.data)) }
    Twrite(m, f) {
        write!(f, "fid {} offset {} count {} {}", m.fid, m.offset, m.data.len(), Data(&m.data))
    }
    Rwrite(m, f) { write!(f, "count {}", m.count) }
    Tclunk(m, f) { write!(f, "fid {}", m.fid) }
    Rclunk(_m, _f) { Ok(()) }
    Tremove(m, f) { write!(f, "fid {}", m.fid) }
    Rremove(_m, _f) { Ok(()) }
    Tstat(m, f) { write!(f, "fid {}", m.fid) }
    Rstat(m, f) { m.stat.fmt(f) }
    Twstat(m, f) { write!(f, "fid {} {}", m.fid, m.stat) }
    Rwstat(_m, _f) { Ok(()) }
}

struct Body<'a>(&'a Message);

impl Display for Body<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        self.0.fmt_body(f)
    }
}

/// `Name[ tag N][ body]`, with no trailing whitespace.
fn write_trace(f: &mut Formatter<'_>, message: &Message, tagged: Option<u16>) -> fmt::Result {
    f.write_str(message.message_type().name())?;
    if let Some(t) = tagged {
        write!(f, " tag {}", tag(t))?;
    }
    let body = Body(message).to_string();
    let body = body.trim_end();
    if body.is_empty() {
        Ok(())
    } else {
        write!(f, " {body}")
    }
}

impl Display for Message {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write_trace(f, self, None)
    }
}

impl Display for TaggedMessage {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write_trace(f, &self.message, Some(self.tag))
    }
}
