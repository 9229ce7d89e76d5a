//! Microbenchmark over a representative markup fixture: nested tables,
//! optional-end-tag lists, a script block with an embedded comment, and a
//! handful of named/numeric entities.

const FIXTURE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8">
  <title>Fixture &amp; Friends</title>
  <style>body{color:#333}</style>
</head>
<body>
  <ul>
    <li>One
    <li>Two
    <li>Three
  </ul>
  <table border="0" width="216">
    <thead>
      <tr><th>Name<th>Count
    </thead>
    <tbody>
      <tr><td>Widgets<td>12
      <tr><td>Gadgets<td>7
    </tbody>
  </table>
  <script>
    var x = 1 < 2;
    <!--console.log("hidden from old browsers")-->
  </script>
  <p>Copyright &copy; 2026 &mdash; all rights reserved. &#38; then some.</p>
</body>
</html>"#;

fn main() {
    divan::main();
}

#[divan::bench]
fn bench_parse_fixture(bencher: divan::Bencher) {
    bencher.bench(|| html_parser::parse(FIXTURE));
}
