use super::{Flavor, Formatter, Params, ToSql};

pub(super) struct Ident<S>(pub(super) S);

impl<S: AsRef<str>> ToSql for Ident<S> {
    fn to_sql<T: Params>(self, f: &mut Formatter<'_, T>) {
        let name = self.0.as_ref();

        match f.dialect.flavor {
            Flavor::Ansi => f.dst.push_str(name),
            Flavor::Mysql => quote(f.dst, name, '`'),
            Flavor::Postgresql | Flavor::Sqlite => quote(f.dst, name, '"'),
        }
    }
}

// Embedded quote characters are escaped by doubling
fn quote(dst: &mut String, name: &str, quote: char) {
    dst.push(quote);
    for ch in name.chars() {
        if ch == quote {
            dst.push(quote);
        }
        dst.push(ch);
    }
    dst.push(quote);
}
